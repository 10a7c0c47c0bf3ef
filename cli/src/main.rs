use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tfidf_core::persist::{open_corpus, save_corpus, CorpusPaths};
use tfidf_core::{Corpus, DocId, Document, DEFAULT_K};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::Path;

#[derive(Parser)]
#[command(name = "tfidf")]
#[command(about = "Rank documents with TF-IDF cosine similarity", long_about = None)]
struct Cli {
    /// Saved corpus directory, a JSON/JSONL file, or a directory of them
    #[arg(long, global = true, default_value = "./corpus")]
    corpus: String,
    /// Print machine-readable JSON instead of a table
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents against a free-text query
    Search {
        #[arg(long, short)]
        query: String,
        /// Number of results to return
        #[arg(short, default_value_t = DEFAULT_K)]
        k: usize,
    },
    /// Corpus vocabulary with term and document frequencies
    Vocab {
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Word, sentence and character counts per document
    Stats,
    /// Keyword-in-context lines for a regular expression
    Concord {
        #[arg(long, short)]
        pattern: String,
        #[arg(long, default_value_t = 30)]
        context: usize,
    },
    /// Every match of a regular expression in the concatenated corpus text
    Find {
        #[arg(long, short)]
        pattern: String,
    },
    /// List documents sorted by title or by date (newest first)
    List {
        #[arg(long, value_enum, default_value_t = SortKey::Title)]
        by: SortKey,
        /// Only show the first N documents
        #[arg(short)]
        n: Option<usize>,
    },
    /// Authors with their document counts
    Authors,
    /// Document count and mean text length for one author
    Author {
        #[arg(long)]
        name: String,
    },
    /// Save the loaded documents as a corpus directory
    Import {
        #[arg(long)]
        output: String,
        /// Corpus name stored in meta.json
        #[arg(long, default_value = "corpus")]
        name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortKey {
    Title,
    Date,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let corpus = open_corpus(Path::new(&cli.corpus))?;
    tracing::info!(num_docs = corpus.len(), num_authors = corpus.num_authors(), "corpus loaded");

    match cli.command {
        Commands::Search { query, k } => {
            let hits = corpus.search(&query, k);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("no results for {query:?}");
            } else {
                println!("{:<8} {:<6} {:<30} {:<20} excerpt", "score", "id", "title", "author");
                for h in hits {
                    println!(
                        "{:<8.4} {:<6} {:<30} {:<20} {}",
                        h.score,
                        h.doc_id,
                        clip(&h.title, 30),
                        clip(&h.author, 20),
                        clip(&h.excerpt, 60)
                    );
                }
            }
        }
        Commands::Vocab { top } => {
            let vocab = corpus.vocabulary();
            let vocab = &vocab[..top.min(vocab.len())];
            if cli.json {
                println!("{}", serde_json::to_string_pretty(vocab)?);
            } else {
                println!("{:<24} {:>8} {:>6}", "term", "tf", "df");
                for t in vocab {
                    println!("{:<24} {:>8} {:>6}", t.term, t.tf, t.df);
                }
            }
        }
        Commands::Stats => {
            let stats = corpus.document_stats();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{:<6} {:>8} {:>10} {:>10}", "id", "words", "sentences", "chars");
                for s in stats {
                    println!("{:<6} {:>8} {:>10} {:>10}", s.doc_id, s.words, s.sentences, s.chars);
                }
            }
        }
        Commands::Concord { pattern, context } => {
            let lines = corpus.concordance(&pattern, context)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&lines)?);
            } else {
                for l in lines {
                    let left = l.left.replace('\n', " ");
                    let right = l.right.replace('\n', " ");
                    println!("{:>6}  {:>w$} [{}] {}", l.doc_id, left, l.matched, right, w = context);
                }
            }
        }
        Commands::Find { pattern } => {
            let matches = corpus.find_all(&pattern)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                println!("{} matches", matches.len());
                for m in matches {
                    println!("{m}");
                }
            }
        }
        Commands::List { by, n } => {
            let docs = match by {
                SortKey::Title => corpus.by_title(n),
                SortKey::Date => corpus.by_date(n),
            };
            print_documents(&docs, cli.json)?;
        }
        Commands::Authors => {
            let registry = corpus.authors();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&registry)?);
            } else {
                println!("{} authors", registry.len());
                for (name, ids) in registry {
                    println!("{:<30} {:>6}", clip(&name, 30), ids.len());
                }
            }
        }
        Commands::Author { name } => {
            let Some(stats) = corpus.author_stats(&name) else {
                bail!("author {name:?} not found in corpus");
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!(
                    "{}: {} documents, mean length {:.2} chars",
                    stats.name, stats.documents, stats.mean_text_len
                );
            }
        }
        Commands::Import { output, name } => {
            let mut named = Corpus::new(name);
            for (id, doc) in corpus.iter() {
                named.insert(id, doc.clone());
            }
            save_corpus(&CorpusPaths::new(&output), &named)?;
            println!("saved {} documents to {output}", named.len());
        }
    }
    Ok(())
}

fn print_documents(docs: &[(DocId, &Document)], json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = docs
            .iter()
            .map(|(id, d)| {
                serde_json::json!({
                    "doc_id": id,
                    "title": d.title,
                    "author": d.author_line(),
                    "date": d.date,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    println!("{:<6} {:<40} {:<24} date", "id", "title", "author");
    for (id, d) in docs {
        println!("{:<6} {:<40} {:<24} {}", id, clip(&d.title, 40), clip(&d.author_line(), 24), d.date);
    }
    Ok(())
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
