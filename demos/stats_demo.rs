use clap::Parser;
use slim_hash::IntMap;

#[derive(Parser, Debug)]
struct Args {
    /// Number of keys to insert.
    #[arg(short = 'n', long = "count", default_value_t = 1000)]
    count: u64,

    /// Percentage of inserted keys to delete afterwards.
    #[arg(short = 'd', long = "delete_percent", default_value_t = 30)]
    delete_percent: u64,

    /// Rehash in place after deleting.
    #[arg(short = 'o', long = "optimize")]
    optimize: bool,
}

fn main() {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args = Args::parse();

    let mut table: IntMap<u64, u64> = IntMap::new();
    println!("Initial capacity: {}", table.capacity());

    for key in 0..args.count {
        table.put(&key, key * 2);
    }
    println!(
        "Inserted {} keys, capacity {}, load {:.2}%",
        table.len(),
        table.capacity(),
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );
    table.probe_histogram().print();
    table.debug_stats().print();

    let to_delete = args.count * args.delete_percent.min(100) / 100;
    for key in 0..to_delete {
        table.delete(&key);
    }
    println!(
        "Deleted {} keys, {} tombstones, capacity {}",
        to_delete,
        table.deleted(),
        table.capacity()
    );

    if args.optimize {
        match table.optimize() {
            Ok(()) => println!("Optimized, {} tombstones left", table.deleted()),
            Err(failure) => println!("Optimize failed: {failure}"),
        }
    }

    table.probe_histogram().print();
    table.debug_stats().print();
}
