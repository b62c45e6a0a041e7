// src/main.rs

use mergebench::errors::MergeBenchError;
use mergebench::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = match cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            // --help and --version go to stdout and are not errors.
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    if let Err(err) = run_main(args).await {
        eprintln!("mergebench error: {err:?}");
        let code = err
            .downcast_ref::<MergeBenchError>()
            .map_or(1, MergeBenchError::exit_code);
        std::process::exit(code);
    }
}

async fn run_main(args: cli::CliArgs) -> anyhow::Result<()> {
    logging::init_logging(args.log_level, args.log_file.as_deref())?;
    run(args).await
}
