use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod enrich;
mod fetch;
mod money;
mod period;
mod progress;
mod stripe;
mod transaction;
mod vat;

#[derive(Parser, Debug)]
#[command(name = "vatc", version, about = "Monthly VAT report from Stripe payments")]
struct Opts {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the month's payments and refunds and print the VAT report
    Report(cmd::report::ReportCommand),
    /// Print the UTC range covered by a month
    Period(cmd::period::PeriodCommand),
}

fn main() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let opts = Opts::parse();
    match opts.command {
        Command::Report(report) => report.exec(),
        Command::Period(period) => period.exec(),
    }
}
