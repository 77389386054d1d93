use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "nbts-campaigns")]
#[command(about = "NBTS blood donation campaigns API (scrape + geocode + proximity filter)", long_about = None)]
pub struct Args {
    /// Port to listen on (all interfaces).
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
}
