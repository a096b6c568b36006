use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use trbx_core::{read_csv, write_csv};
use trbx_generate::{generate_synthetic, GenerateOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut input: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;
    let mut options = GenerateOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => out = args.next().map(PathBuf::from),
            "--target" => options.target_column = args.next(),
            "--samples" => {
                options.n_samples = args.next().ok_or("missing --samples value")?.parse()?;
            }
            _ => {
                if input.is_none() {
                    input = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let input = input.ok_or("missing input csv path")?;
    let out = out.unwrap_or_else(|| PathBuf::from("synthetic.csv"));

    let real = read_csv(&input)?;
    let output = generate_synthetic(&real, &options)?;
    write_csv(&out, &output.synthetic)?;

    println!("synthetic_path={}", out.display());
    if let Some(quality) = output.quality {
        match quality.aggregate() {
            Some(score) => println!("global_ks_score={score:.4}"),
            None => println!("global_ks_score=unavailable"),
        }
    }
    Ok(())
}
