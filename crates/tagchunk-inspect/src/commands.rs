//! Subcommand handlers
//!
//! Each handler loads its file, runs the matching parser and renders a
//! report as text or JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tagchunk_formats::ParserConfig;
use tagchunk_formats::sounddiver::{Endian, ListEntry, MROF_MAGIC, SounddiverLibrary};
use tagchunk_formats::vstpreset::{PresetChunk, PresetKind, VstPreset};
use tagchunk_stream::FourCC;
use tracing::{debug, info};

use crate::{Commands, OutputFormat};

/// Run `command` and return its rendered report
pub fn run(command: &Commands, config: &ParserConfig, format: OutputFormat) -> Result<String> {
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid parser limits")?;

    match command {
        Commands::Preset { file, show_data } => {
            let data = read_file(file)?;
            let preset = VstPreset::read_with_config(&data, config)
                .with_context(|| format!("failed to parse preset {}", file.display()))?;
            info!(
                "{}: {} with {} chunks",
                file.display(),
                preset.kind(),
                preset.chunks().len()
            );
            render(format, preset_text(&preset, *show_data), || {
                preset_json(&preset, *show_data)
            })
        }
        Commands::Sounddiver { file, show_data } => {
            let data = read_file(file)?;
            let library = SounddiverLibrary::try_load_with_config(&data, config)
                .with_context(|| format!("failed to load library {}", file.display()))?;
            info!("{}: {} entries", file.display(), library.len());
            render(format, library_text(&library, *show_data), || {
                library_json(&library, *show_data)
            })
        }
        Commands::Detect { file } => {
            let data = read_file(file)?;
            let detection = Detection::of(&data);
            render(format, detection.text(), || detection.json())
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    debug!("Read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

fn render(format: OutputFormat, text: String, json: impl FnOnce() -> Value) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => text,
        OutputFormat::Json => serde_json::to_string(&json())?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&json())?,
    })
}

fn byte_order_name(endian: Endian) -> &'static str {
    match endian {
        Endian::Big => "big-endian",
        Endian::Little => "little-endian",
    }
}

fn chunk_label(chunk: &PresetChunk) -> String {
    chunk
        .id
        .map_or_else(|| "VST2".to_string(), |id| id.to_string())
}

fn preset_text(preset: &VstPreset, show_data: bool) -> String {
    let mut lines = vec![format!(
        "{}, {} chunks",
        preset.kind(),
        preset.chunks().len()
    )];
    for (index, chunk) in preset.chunks().iter().enumerate() {
        lines.push(format!(
            "[{index}] {:<6} {} bytes",
            chunk_label(chunk),
            chunk.data.len()
        ));
        if show_data {
            lines.push(format!("    {}", hex::encode(&chunk.data)));
        }
    }
    lines.join("\n")
}

fn preset_json(preset: &VstPreset, show_data: bool) -> Value {
    let chunks: Vec<Value> = preset
        .chunks()
        .iter()
        .map(|chunk| {
            let mut value = json!({
                "id": chunk.id.map(|id| id.to_string()),
                "opaque_vst2": chunk.is_opaque_vst2(),
                "size": chunk.data.len(),
            });
            if show_data {
                value["data"] = Value::String(hex::encode(&chunk.data));
            }
            value
        })
        .collect();
    json!({
        "kind": preset.kind().to_string(),
        "chunks": chunks,
    })
}

fn entry_lines(index: usize, entry: &ListEntry, show_data: bool) -> Vec<String> {
    let mut lines = vec![
        format!("[{index}] {}", entry.name),
        format!(
            "    type {}, model {:02X}/{:02X}, device {}",
            entry.entry_type, entry.model_type_a, entry.model_type_b, entry.device_id
        ),
        format!("    date {}", entry.date_time),
    ];
    if !entry.location.is_empty() {
        lines.push(format!("    location: {}", entry.location));
    }
    if !entry.comment.is_empty() {
        lines.push(format!("    comment: {}", entry.comment));
    }
    lines.push(format!("    data: {} bytes", entry.data.len()));
    if show_data && !entry.data.is_empty() {
        lines.push(format!("        {}", hex::encode(&entry.data)));
    }
    lines
}

fn library_text(library: &SounddiverLibrary, show_data: bool) -> String {
    let order = library.byte_order().map_or("unknown byte order", byte_order_name);
    let mut lines = vec![format!(
        "Sounddiver library, {order}, {} entries",
        library.len()
    )];
    for (index, entry) in library.entries().iter().enumerate() {
        lines.extend(entry_lines(index, entry, show_data));
    }
    lines.join("\n")
}

fn library_json(library: &SounddiverLibrary, show_data: bool) -> Value {
    let entries: Vec<Value> = library
        .entries()
        .iter()
        .map(|entry| {
            let mut value = json!({
                "name": entry.name,
                "location": entry.location,
                "comment": entry.comment,
                "entry_type": entry.entry_type,
                "model_type": [entry.model_type_a, entry.model_type_b],
                "device_id": entry.device_id,
                "date_time": entry.date_time.to_string(),
                "data_size": entry.data.len(),
            });
            if show_data {
                value["data"] = Value::String(hex::encode(&entry.data));
            }
            value
        })
        .collect();
    json!({
        "byte_order": library.byte_order().map(byte_order_name),
        "entries": entries,
    })
}

/// What a file's leading bytes look like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Detection {
    magic: Option<FourCC>,
    preset: Option<PresetKind>,
    sounddiver: Option<Endian>,
}

impl Detection {
    fn of(data: &[u8]) -> Self {
        let sounddiver = if SounddiverLibrary::is_valid_data(data) {
            match FourCC::from_prefix(data) {
                Some(MROF_MAGIC) => Some(Endian::Little),
                _ => Some(Endian::Big),
            }
        } else {
            None
        };
        Self {
            magic: FourCC::from_prefix(data),
            preset: PresetKind::detect(data),
            sounddiver,
        }
    }

    fn text(&self) -> String {
        if let Some(kind) = self.preset {
            return kind.to_string();
        }
        if let Some(endian) = self.sounddiver {
            return format!("Sounddiver library ({})", byte_order_name(endian));
        }
        match self.magic {
            Some(magic) => format!("unknown format (magic {magic})"),
            None => "unknown format (fewer than 4 bytes)".to_string(),
        }
    }

    fn json(&self) -> Value {
        let format = match (self.preset, self.sounddiver) {
            (Some(PresetKind::Vst2), _) => "vst2",
            (Some(PresetKind::Vst3), _) => "vst3",
            (None, Some(_)) => "sounddiver",
            (None, None) => "unknown",
        };
        json!({
            "format": format,
            "magic": self.magic.map(|magic| magic.to_string()),
            "byte_order": self.sounddiver.map(byte_order_name),
        })
    }
}
