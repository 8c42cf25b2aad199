use anyhow::Result;
use calc_rpc::cli::{self, ClientArgs};
use calc_rpc::logger;
use calc_rpc::CalculatorClient;
use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = match ClientArgs::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            err.print()?;
            return Ok(ExitCode::from(1));
        }
    };

    logger::init_logger("calc_rpc=warn");

    let client = CalculatorClient::new(&args.url)?;

    println!("{}", args.expression_line());
    match client.calculate(&args.request()).await {
        Ok(response) => {
            let (line, ok) = cli::render_response(&response);
            println!("{}", line);
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::from(1) })
        }
        Err(err) => {
            eprintln!("{}", cli::render_failure(&err));
            Ok(ExitCode::from(1))
        }
    }
}
