use stagehand::ui::output;

fn main() {
    match stagehand::cli::run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            output::error(format!("{:#}", err));
            std::process::exit(1);
        }
    }
}
