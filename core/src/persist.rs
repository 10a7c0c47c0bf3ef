use crate::document::{DocKind, Document};
use crate::index::DocId;
use crate::store::Corpus;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub name: String,
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

/// On-disk form of one document. `id` is optional on input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kind: DocKind,
}

impl DocRecord {
    pub fn from_document(id: DocId, doc: &Document) -> Self {
        Self {
            id: Some(id),
            title: doc.title.clone(),
            author: doc.author.clone(),
            date: doc.date.clone(),
            url: doc.url.clone(),
            text: doc.text.clone(),
            kind: doc.kind.clone(),
        }
    }

    pub fn into_parts(self) -> (Option<DocId>, Document) {
        let doc = Document {
            title: self.title,
            author: self.author,
            date: self.date,
            url: self.url,
            text: self.text,
            kind: self.kind,
        };
        (self.id, doc)
    }
}

pub struct CorpusPaths {
    pub root: PathBuf,
}

impl CorpusPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn documents(&self) -> PathBuf { self.root.join("documents.jsonl") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    /// Whether `root` looks like a directory written by [`save_corpus`].
    pub fn exists(&self) -> bool {
        self.meta().is_file() && self.documents().is_file()
    }
}

pub fn save_meta(paths: &CorpusPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &CorpusPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Write every document as JSON lines plus a meta file. The index is never stored.
pub fn save_corpus(paths: &CorpusPaths, corpus: &Corpus) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut w = BufWriter::new(File::create(paths.documents())?);
    for (id, doc) in corpus.iter() {
        serde_json::to_writer(&mut w, &DocRecord::from_document(id, doc))?;
        w.write_all(b"\n")?;
    }
    w.flush()?;

    let meta = MetaFile {
        name: corpus.name().to_string(),
        num_docs: corpus.len() as u32,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: FORMAT_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, "corpus saved");
    Ok(())
}

pub fn load_corpus(paths: &CorpusPaths) -> Result<Corpus> {
    let meta = load_meta(paths).with_context(|| format!("reading {}", paths.meta().display()))?;
    if meta.version != FORMAT_VERSION {
        bail!("unsupported corpus format version {}", meta.version);
    }
    let records = read_jsonl(&paths.documents())?;
    let mut corpus = Corpus::new(meta.name);
    ingest(&mut corpus, records)?;
    Ok(corpus)
}

/// Read document records from a `.jsonl` file or a `.json` file holding one object or an array.
pub fn read_documents(file: &Path) -> Result<Vec<DocRecord>> {
    if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        return read_jsonl(file);
    }
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(|v| serde_json::from_value::<DocRecord>(v).map_err(anyhow::Error::from))
            .collect(),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(json)?]),
        _ => Ok(Vec::new()),
    }
}

/// Load a saved corpus directory, or ingest JSON/JSONL input from a file or directory tree.
pub fn open_corpus(path: &Path) -> Result<Corpus> {
    let paths = CorpusPaths::new(path);
    if paths.exists() {
        return load_corpus(&paths);
    }

    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        bail!("corpus path {} does not exist", path.display());
    }

    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("corpus").to_string();
    let mut corpus = Corpus::new(name);
    for file in files {
        let records = read_documents(&file)?;
        tracing::debug!(file = %file.display(), records = records.len(), "read input file");
        ingest(&mut corpus, records)?;
    }
    Ok(corpus)
}

/// Add records to `corpus`; records carrying an id keep it, the rest get fresh ids.
pub fn ingest(corpus: &mut Corpus, records: Vec<DocRecord>) -> Result<()> {
    for record in records {
        match record.into_parts() {
            (Some(id), doc) => {
                if corpus.insert(id, doc).is_some() {
                    tracing::warn!(id, "duplicate document id, keeping the later record");
                }
            }
            (None, doc) => {
                corpus.add(doc)?;
            }
        }
    }
    Ok(())
}

fn read_jsonl(file: &Path) -> Result<Vec<DocRecord>> {
    let reader = BufReader::new(File::open(file)?);
    let mut out = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let record: DocRecord = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        out.push(record);
    }
    Ok(out)
}
