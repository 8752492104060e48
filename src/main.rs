//! Demo driver: fabricates sample files and exercises the filesystem

use std::process;

use log::{error, warn};

use fatsim::constants::CLUSTER_SIZE;
use fatsim::{logging, FatVolume, FsError};

/// Demo files written by the driver: name and payload size in bytes
const DEMO_FILES: [(&str, usize); 4] = [
    ("file1.txt", 1000),
    ("file2.txt", 2000),
    ("file3.txt", 3000),
    ("file4.txt", 4000),
];

fn main() {
    logging::init();

    if std::env::args().len() > 1 {
        usage();
    }

    let mut volume = FatVolume::new();

    for &(name, size) in &DEMO_FILES[..3] {
        write_file(&mut volume, name, &sample_payload(size));
    }
    if let Err(err) = volume.delete("file2.txt") {
        warn!("delete 'file2.txt': {}", err);
    }
    let (name, size) = DEMO_FILES[3];
    write_file(&mut volume, name, &sample_payload(size));

    for &(name, _) in &DEMO_FILES {
        print_clusters(&volume, name);
    }

    println!("-- FILE DIRECTORY --");
    for &(name, _) in &DEMO_FILES {
        print_metadata(&volume, name);
    }
    println!();

    for &(name, _) in &DEMO_FILES {
        print_contents(&volume, name);
    }
}

/// Prints the correct usage to stderr
fn usage() -> ! {
    eprintln!("usage: fatsim [no options...]");
    process::exit(1);
}

/// Fills a payload with a repeating lowercase alphabet
fn sample_payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| b'a' + (i % 26) as u8).collect()
}

/// Writes one file, treating a full disk as fatal to the run
fn write_file(volume: &mut FatVolume, name: &str, data: &[u8]) {
    match volume.write(name, data) {
        Ok(()) => {}
        Err(FsError::DiskFull) => {
            error!("failed to write '{}', disk is full", name);
            process::exit(1);
        }
        Err(err) => warn!("write '{}': {}", name, err),
    }
}

/// Prints every cluster address of a file followed by an EOF marker
fn print_clusters(volume: &FatVolume, name: &str) {
    match volume.clusters(name) {
        Ok(chain) => {
            for addr in &chain.clusters {
                println!("Cluster address for file '{}': {}", name, addr);
            }
            println!("Cluster address for file '{}': EOF", name);
            println!();
        }
        Err(_) => println!("-- File not found --\n"),
    }
}

/// Prints one row of the file directory table
fn print_metadata(volume: &FatVolume, name: &str) {
    match volume.metadata(name) {
        Ok(info) => println!(
            "| {} | {} | {} bytes | {} |",
            info.name, info.created, info.size, info.start_cluster
        ),
        Err(_) => println!("-- File not found --"),
    }
}

/// Prints a file's contents cluster by cluster
fn print_contents(volume: &FatVolume, name: &str) {
    let (chain, contents) = match (volume.clusters(name), volume.read(name)) {
        (Ok(chain), Ok(contents)) => (chain, contents),
        _ => {
            println!("-- File not found --\n");
            return;
        }
    };
    for (addr, block) in chain.clusters.iter().zip(contents.chunks(CLUSTER_SIZE)) {
        println!("{}", String::from_utf8_lossy(block));
        println!("^^^ Cluster #{}", addr);
    }
    println!();
}
