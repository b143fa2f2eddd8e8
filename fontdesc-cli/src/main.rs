//! Binary entrypoint for fontdesc-cli (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = fontdesc_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
