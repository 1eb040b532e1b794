//! Adapted from the `priority_queue` walkthrough in tidwall/bgen's own
//! examples: a max-ordered and a min-ordered queue are just the same
//! ordered tree read off from opposite ends, via `pop_back`/`pop_front`.

use bgen_rs::Set;

fn main() {
    let data = [1, 8, 5, 6, 3, 4, 0, 9, 7, 2];
    print!("data: ");
    for value in data {
        print!("{value} ");
    }
    println!();

    let mut max_queue: Set<i32, _> = Set::new(|a: &i32, b: &i32| a.cmp(b), bgen_rs::Uncounted, bgen_rs::NoSpatial);
    for value in data {
        max_queue.insert(value);
    }
    print!("max_priority_queue: ");
    while let Some(value) = max_queue.pop_back() {
        print!("{value} ");
    }
    println!();

    let mut min_queue: Set<i32, _> = Set::new(|a: &i32, b: &i32| a.cmp(b), bgen_rs::Uncounted, bgen_rs::NoSpatial);
    for value in data {
        min_queue.insert(value);
    }
    print!("min_priority_queue: ");
    while let Some(value) = min_queue.pop_front() {
        print!("{value} ");
    }
    println!();
}
