//! Print the DDL the gateway would run, without connecting to a database
//!
//! Usage:
//!   cargo run --bin ddl-preview
//!   cargo run --bin ddl-preview -- --drop
//!   cargo run --bin ddl-preview -- --seed

use std::env;

use rideshare_db_gateway::schema::{seed_statements, standard_catalog};

fn main() {
    let mode = env::args().nth(1).unwrap_or_default();
    let catalog = standard_catalog();

    if let Err(e) = catalog.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let graph = catalog.dependency_graph();
    let order = match graph.topological_order() {
        Ok(order) => order,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let statements = match mode.as_str() {
        "" | "--create" => {
            println!("-- Creation order: {}", order.join(", "));
            println!();
            for line in graph.format().lines() {
                println!("-- {}", line);
            }
            catalog.creation_statements()
        }
        "--drop" => catalog.drop_statements(true),
        "--seed" => seed_statements(),
        other => {
            eprintln!("Unknown option: {}", other);
            eprintln!("Usage: ddl-preview [--create | --drop | --seed]");
            std::process::exit(1);
        }
    };

    for statement in statements {
        println!("{};\n", statement);
    }
}
