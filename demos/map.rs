//! Adapted from the `map` walkthrough in tidwall/bgen's own examples.

use bgen_rs::{Map, Status};

#[derive(Clone, Debug)]
struct Pair {
    key: &'static str,
    value: i32,
}

fn print_map(comment: &str, map: &Map<Pair, impl Fn(&Pair, &Pair) -> std::cmp::Ordering>) {
    print!("{comment}");
    for pair in map.iter() {
        print!("[{}] = {}; ", pair.key, pair.value);
    }
    println!();
}

fn main() {
    let mut map: Map<Pair, _> = Map::new(|a: &Pair, b: &Pair| a.key.cmp(b.key), bgen_rs::Uncounted, bgen_rs::NoSpatial);

    map.insert(Pair { key: "GPU", value: 15 });
    map.insert(Pair { key: "RAM", value: 20 });
    map.insert(Pair { key: "CPU", value: 10 });
    print_map("1) Initial map:  ", &map);

    let item = map.get(&Pair { key: "GPU", value: 0 }).expect("GPU present");
    println!("2) Get item:     [{}] = {};", item.key, item.value);

    assert_eq!(map.insert(Pair { key: "CPU", value: 25 }), Status::Replaced);
    assert_eq!(map.insert(Pair { key: "SSD", value: 30 }), Status::Inserted);
    print_map("3) Updated map:  ", &map);

    assert_eq!(map.insert(Pair { key: "UPS", value: 0 }), Status::Inserted);
    print_map("4) Updated map:  ", &map);

    assert_eq!(map.delete(&Pair { key: "GPU", value: 0 }), Status::Deleted);
    print_map("5) After delete: ", &map);
}
