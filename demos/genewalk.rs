use std::process;

use genewalk::Config;

fn main() {
    simple_logger::init_with_env().unwrap();

    let mut args = std::env::args();
    if args.len() < 2 {
        println!("Significant GO terms for genes of interest\n\n");
        println!("Usage\ngenewalk <FOLDER> [<ALPHA FDR>] [<OUTPUT FILENAME>]");
        println!("\ngenewalk tests/data 0.05 GeneWalk.csv\n");
        println!("Set RUST_LOG=debug for verbose output");
        process::exit(1)
    }

    let mut config = Config::new(args.nth(1).unwrap());

    if let Some(alpha) = args.next() {
        let alpha = alpha.parse::<f64>().expect("Invalid significance level");
        config = config.with_alpha(alpha).expect("Invalid significance level");
    }

    if let Some(output) = args.next() {
        config = config.with_output(&output);
    }

    match genewalk::run(&config) {
        Ok(report) => {
            for row in &report {
                println!(
                    "{}\t{}\t{}\t{:.4}\t{:e}",
                    row.symbol(),
                    row.go_id(),
                    row.go_description(),
                    row.similarity(),
                    row.padj()
                );
            }
            println!(
                "\nGenes with significant GO terms: {}\nSignificant GO terms: {}",
                report.genes().len(),
                report.len()
            );
        }
        Err(err) => {
            eprintln!("GeneWalk failed: {err}");
            process::exit(1)
        }
    }
}
