use std::{env, path::PathBuf};

use skillmentor_core::config::{expand_path, Config};
use skillmentor_core::corpus::CorpusLoader;
use skillmentor_embed::default_embedder;
use skillmentor_vector::Retriever;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut corpus = None; let mut show_progress = settings.retrieval.show_progress;
    for arg in &args { match arg.as_str() {
        "--progress" | "-p" => show_progress = true,
        "--help" | "-h" => { println!("Usage: skillmentor-indexer [corpus file or directory] [--progress]"); return Ok(()); }
        a if !a.starts_with('-') => corpus = Some(PathBuf::from(a)),
        other => { eprintln!("Unknown option: {}", other); std::process::exit(1); }
    } }
    let corpus = corpus.unwrap_or_else(|| expand_path(&settings.data.corpus_path));
    let index_path = expand_path(&settings.data.index_path);
    let documents_path = expand_path(&settings.data.documents_path);

    println!("SkillMentor Indexer\n===================");
    println!("Corpus: {}", corpus.display());
    let documents = CorpusLoader::new().load(&corpus)?;
    println!("Loaded {} documents", documents.len());

    let retriever = Retriever::new(default_embedder(&settings.embedding)?)
        .with_batch_size(settings.retrieval.batch_size)
        .with_progress(show_progress);
    let count = retriever.create_index(documents)?;
    retriever.save(&index_path, &documents_path)?;

    println!("\n✅ Indexed {} documents", count);
    println!("📦 Vectors:   {}", index_path.display());
    println!("📄 Documents: {}", documents_path.display());
    println!("\n💡 Ask a question with: cargo run --bin skillmentor -- ask \"<question>\"");
    Ok(())
}
