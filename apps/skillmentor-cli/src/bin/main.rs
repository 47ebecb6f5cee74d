use std::env;
use std::io::{self, Write};

use skillmentor_advice::{AdviceResponse, AdviceSource, SkillMentor};
use skillmentor_core::config::{expand_path, Config};
use skillmentor_core::corpus::CorpusLoader;
use skillmentor_embed::default_embedder;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() { eprintln!("Usage: {} <ask|chat|index> [args...]", prog); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let (cmd, args) = parse_args();

    let mentor = SkillMentor::from_settings(&settings, default_embedder(&settings.embedding)?)?;
    match cmd.as_str() {
        "ask" => {
            let json = args.iter().any(|a| a == "--json");
            let query = args.iter().filter(|a| !a.starts_with("--")).cloned().collect::<Vec<_>>().join(" ");
            if query.trim().is_empty() { eprintln!("Usage: skillmentor ask \"<question>\" [--json]"); std::process::exit(1); }
            let response = mentor.advise(&query).await?;
            if json { println!("{}", serde_json::to_string_pretty(&response)?); } else { print_response(&response); }
        }
        "chat" => chat(&mentor).await?,
        "index" => {
            let corpus = args.first().map(expand_path).unwrap_or_else(|| expand_path(&settings.data.corpus_path));
            let documents = CorpusLoader::new().load(&corpus)?;
            let index_path = expand_path(&settings.data.index_path);
            let documents_path = expand_path(&settings.data.documents_path);
            let count = mentor.initialize_dataset(documents, Some(&index_path), Some(&documents_path))?;
            println!("✅ Indexed {} documents from {}", count, corpus.display());
        }
        other => { eprintln!("Unknown command: {}", other); std::process::exit(1); }
    }
    Ok(())
}

async fn chat(mentor: &SkillMentor) -> anyhow::Result<()> {
    println!("💡 SkillMentor");
    println!("==============");
    if !mentor.retriever().is_ready() { println!("⚠️  No index loaded; answers use built-in advice only. Run `skillmentor index` first."); }
    show_help();

    let mut last: Option<Uuid> = None;
    loop {
        print!("ask> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 { break; }
        let input = input.trim();
        if input.is_empty() { continue; }

        match input.split_once(' ').map_or((input, ""), |(c, rest)| (c, rest.trim())) {
            ("/help" | "/h", _) => show_help(),
            ("/quit" | "/q" | "quit" | "exit", _) => { println!("👋 Goodbye!"); break; }
            ("/metrics" | "/m", _) => show_metrics(mentor),
            ("/rate" | "/r", rest) => {
                let Some(id) = last else { println!("❌ Nothing to rate yet"); continue; };
                let (rating, comment) = rest.split_once(' ').map_or((rest, None), |(r, c)| (r, Some(c.trim().to_string())));
                match rating.parse::<u8>().map_err(anyhow::Error::from).and_then(|r| Ok(mentor.record_feedback(id, r, comment)?)) {
                    Ok(()) => println!("🙏 Thanks for the feedback"),
                    Err(e) => println!("❌ {}", e),
                }
            }
            _ => match mentor.advise(input).await {
                Ok(response) => { print_response(&response); last = Some(response.id); }
                Err(e) => println!("❌ {}", e),
            },
        }
        println!();
    }
    Ok(())
}

fn show_help() {
    println!("Commands:");
    println!("  /rate <1-5> [comment] - Rate the last answer");
    println!("  /metrics              - Show session statistics");
    println!("  /help                 - Show this help message");
    println!("  /quit                 - Exit");
    println!("  <question>            - Ask for advice");
    println!();
}

fn print_response(response: &AdviceResponse) {
    let source = match response.source {
        AdviceSource::Backend => "generated",
        AdviceSource::Document => "reference + strategy",
        AdviceSource::Rules => "strategy",
    };
    println!("📂 {} ({}, {:.0} ms)", response.category, source, response.response_time.as_secs_f64() * 1000.0);
    println!("\n{}\n", response.advice);
    for (i, doc) in response.documents.iter().enumerate() {
        let preview: String = doc.document.text.chars().take(80).collect();
        println!("  {}. [{:.3}] {}", i + 1, doc.distance, preview);
    }
}

fn show_metrics(mentor: &SkillMentor) {
    let m = mentor.performance_metrics();
    println!("📊 Queries: {}  avg time: {:.1} ms", m.num_queries, m.avg_response_time * 1000.0);
    for (category, count) in &m.query_distribution { println!("   {:<15} {}", category, count); }
    if m.num_feedback > 0 { println!("⭐ Average rating: {:.1} ({} ratings)", m.avg_user_rating, m.num_feedback); }
}
