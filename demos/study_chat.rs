use dotenv::dotenv;
use std::error::Error;
use std::io::{self, Write};
use std::path::Path;
use study_assistant::{ClientConfig, Mode, PdfExtractor, ProxyClient, StudyAssistant, SubmitOutcome, Upload};

fn print_help() {
    println!("Commands:");
    println!("  :mode <explain|summarize|quiz>   switch study mode");
    println!("  :pdf <path>                      load the text of a PDF as input");
    println!("  :send                            send the loaded PDF text");
    println!("  quit                             exit");
    println!("Anything else is sent as study text.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let config = ClientConfig::from_env();
    println!("📚 Study assistant, talking to {}\n", config.api_url);

    let mut assistant = StudyAssistant::new(ProxyClient::from_config(&config), PdfExtractor);
    print_help();
    println!("------------------------------------------------------------------");

    loop {
        print!("[{}] > ", assistant.ui().selected_mode);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();

        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Some(label) = line.strip_prefix(":mode ") {
            match label.parse::<Mode>() {
                Ok(mode) => assistant.select_mode(mode),
                Err(e) => eprintln!("❌ {}", e),
            }
            continue;
        }

        if let Some(path) = line.strip_prefix(":pdf ") {
            let upload = match Upload::from_path(Path::new(path.trim())).await {
                Ok(upload) => upload,
                Err(e) => {
                    eprintln!("❌ Could not open {}: {}", path.trim(), e);
                    continue;
                }
            };
            match assistant.select_file(upload).await {
                Ok(()) => println!(
                    "✅ Loaded {} characters. Type :send to submit them.",
                    assistant.ui().input_text.chars().count()
                ),
                Err(e) => eprintln!("❌ {}", e),
            }
            continue;
        }

        if line != ":send" {
            assistant.set_input_text(line);
        }

        println!("\nThinking...");

        match assistant.submit().await {
            SubmitOutcome::Completed => {
                println!("\n{}\n", assistant.ui().response_text);
                println!("------------------------------------------------------------------");
            }
            SubmitOutcome::ValidationFailed => {
                assistant.dismiss_alert();
                eprintln!("⚠️  Write some text first.");
            }
            SubmitOutcome::Busy => eprintln!("⏳ Still working on the previous request."),
        }
    }

    Ok(())
}
