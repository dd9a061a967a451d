use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = gapi::cli::Cli::parse();
    let result = match gapi::app::App::initialize() {
        Ok(app) => gapi::cli::run(&cli, &app).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(output) => println!("{}", gapi::cli::render(&output, cli.pretty)),
        Err(err) => {
            eprintln!("gapi: {}", err);
            if let Some(hint) = err.hint.as_deref() {
                eprintln!("hint: {}", hint);
            }
            std::process::exit(1);
        }
    }
}
