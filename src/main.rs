use chirpy::adapters::LocalStorage;
use chirpy::config::TomlConfig;
use chirpy::core::prompt::{category_question, interpretation_prompt};
use chirpy::core::sighting::NO_INFORMATION;
use chirpy::core::{ChatClient, ConfigProvider};
use chirpy::utils::error::{ErrorCategory, Result};
use chirpy::utils::validation::{validate_required_field, Validate};
use chirpy::utils::logger;
use chirpy::{AnthropicClient, CliConfig, Dialogue, RequestSettings, SummaryMode, Vocabulary};
use clap::Parser;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    // 讀取 .env，檔案不存在時略過
    let dotenv = dotenvy::dotenv();

    let mut cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }
    tracing::info!("🐦 Starting chirpy");
    tracing::debug!("CLI config: {:?}", cli);

    let result = match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(&path) {
                Ok(mut file_config) => {
                    file_config.apply_overrides(&cli);
                    run(&file_config, &cli).await
                }
                Err(e) => Err(e),
            }
        }
        // 設定檔自己會退回環境變數，只有純命令列時才在這裡讀
        None => {
            cli.resolve_env();
            run(&cli, &cli).await
        }
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ chirpy failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run<P: ConfigProvider + Validate>(config: &P, cli: &CliConfig) -> Result<()> {
    config.validate()?;

    let vocabulary = match config.vocabulary_file() {
        Some(path) => {
            tracing::info!("📚 Loading vocabulary from: {}", path);
            Vocabulary::from_json_file(path)?
        }
        None => Vocabulary::default(),
    };
    let settings = RequestSettings::from_config(config);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - request is printed, not sent");
        let message = cli.message.as_deref().unwrap_or_default();
        let request = settings.request(interpretation_prompt(
            message,
            cli.category.as_deref(),
            &vocabulary,
        ));
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    let client = AnthropicClient::from_config(config)?;
    tracing::debug!("Using Messages API at {}", client.endpoint());

    let mut dialogue =
        Dialogue::new(client, settings, vocabulary).with_category(cli.category.clone());

    if cli.chat {
        let storage = LocalStorage::new(config.output_path());
        return run_chat(&mut dialogue, cli.summary, &storage).await;
    }

    let message = validate_required_field("message", &cli.message)?;

    if !cli.parse {
        let interpretation = dialogue.interpret(message, cli.category.as_deref()).await?;
        println!("{}", interpretation.raw);
        return Ok(());
    }

    let outcome = dialogue.turn(message).await?;
    println!("{}", outcome.raw);
    println!("{}", serde_json::to_string_pretty(dialogue.state())?);
    println!("{}", dialogue.summarize(cli.summary).await?);

    Ok(())
}

async fn run_chat<C: ChatClient>(
    dialogue: &mut Dialogue<C>,
    mode: SummaryMode,
    storage: &LocalStorage,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("🐦 Describe the bird you saw. An empty line or 'quit' ends the conversation.");
    if let Some(category) = dialogue.pending_category() {
        println!("❓ {}", category_question(category));
    }

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        match dialogue.turn(line).await {
            Ok(outcome) => {
                tracing::debug!("Raw reply: {}", outcome.raw);
                println!("📝 {}", outcome.summary);
                match outcome.next_category {
                    Some(category) => println!("❓ {}", category_question(&category)),
                    None => {
                        println!("That's everything I wanted to ask.");
                        break;
                    }
                }
            }
            // 單輪的資料問題不中斷整段對話
            Err(e) if e.category() == ErrorCategory::Data => {
                tracing::warn!("Turn failed: {}", e);
                eprintln!("⚠️ {}", e.user_friendly_message());
            }
            Err(e) => return Err(e),
        }
    }

    let summary = dialogue.summarize(mode).await?;
    println!("\n{}", summary);

    let saved_summary = (summary != NO_INFORMATION).then_some(summary);
    let sessions = dialogue.save_transcript(storage, saved_summary).await?;
    tracing::info!(
        "💾 Transcript saved to {} ({} sessions)",
        storage
            .full_path(chirpy::core::dialogue::TRANSCRIPT_FILE)
            .display(),
        sessions
    );

    Ok(())
}
