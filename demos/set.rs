//! Adapted from the `set` walkthrough in tidwall/bgen's own examples.

use bgen_rs::Set;

fn print_set(set: &Set<i32, impl Fn(&i32, &i32) -> std::cmp::Ordering>) {
    print!("{{ ");
    for item in set.iter() {
        print!("{item} ");
    }
    print!("}}");
}

fn main() {
    let mut set: Set<i32, _> = Set::new(|a: &i32, b: &i32| a.cmp(b), bgen_rs::Uncounted, bgen_rs::NoSpatial);

    for value in [1, 5, 3] {
        set.insert(value);
    }
    print_set(&set);
    println!();

    set.insert(2);
    print_set(&set);
    println!();

    for key in [3, 4] {
        print_set(&set);
        if set.contains(&key) {
            println!(" does contain {key}");
        } else {
            println!(" doesn't contain {key}");
        }
    }
}
