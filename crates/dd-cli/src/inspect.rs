use dd_api::{
    dialog_summaries, extract_dialog, extract_npc, generate_dialog, generate_function,
    model_to_json, npc_summaries, parse_summary, to_json, DialogView, NpcView,
};
use dd_core::{render_number, DaedalusError};
use serde::Serialize;

use crate::{
    emit_content, generator_options, load_model, resolve_source_path, ExtractArgs,
    ExtractNpcArgs, FileArgs, ListArgs, OutputFormat, ParseArgs,
};

#[derive(Serialize)]
struct DialogExtract<'a> {
    dialog: &'a DialogView,
}

#[derive(Serialize)]
struct NpcExtract<'a> {
    npc: &'a NpcView,
}

pub(crate) fn run_parse(args: ParseArgs) -> Result<i32, DaedalusError> {
    println!("Parsing Daedalus file: {}", args.file);
    let (_, model) = load_model(&args.file)?;
    let summary = parse_summary(&model);
    let dialogs = dialog_summaries(&model);

    println!();
    println!("Parse results:");
    println!("  Total NPCs: {}", summary.npcs);
    println!("  Total dialogs: {}", summary.dialogs);
    println!("  Total dialog NPCs: {}", summary.dialog_npcs.len());
    println!("  Related functions: {}", summary.related_functions);

    let npcs = npc_summaries(&model);
    if !npcs.is_empty() {
        println!();
        println!("NPC instances:");
        for npc in &npcs {
            println!(
                "  {} ({}): {}",
                npc.name,
                npc.parent_type,
                npc.display_name.as_deref().unwrap_or("unnamed")
            );
        }
    }

    if !summary.dialog_npcs.is_empty() {
        println!();
        println!("NPCs with dialogs:");
        for name in &summary.dialog_npcs {
            let count = dialogs
                .iter()
                .filter(|dialog| dialog.npc.as_deref() == Some(name.as_str()))
                .count();
            println!("  {}: {} dialog(s)", name, count);
        }
    }

    if args.pretty {
        println!();
        println!("Semantic model:");
        println!("{}", model_to_json(&model, true)?);
    }
    Ok(0)
}

pub(crate) fn run_list(args: ListArgs) -> Result<i32, DaedalusError> {
    let (script, model) = load_model(&args.file)?;
    println!("Dialogs in {}:", script.file_name());

    let summaries = dialog_summaries(&model);
    if summaries.is_empty() {
        println!("  No dialogs found.");
        return Ok(0);
    }

    for (index, summary) in summaries.iter().enumerate() {
        println!();
        println!("{}. {}", index + 1, summary.name);
        if let Some(npc) = &summary.npc {
            println!("   NPC: {}", npc);
        }
        if let Some(nr) = summary.nr {
            println!("   Number: {}", render_number(nr));
        }
        if let Some(description) = &summary.description {
            println!("   Description: {}", description);
        }
        if let Some(permanent) = summary.permanent {
            println!("   Permanent: {}", permanent);
        }
        println!(
            "   Dialog flow: {} line(s), {} choice(s), other actions: {}",
            summary.lines,
            summary.choices,
            if summary.has_actions { "yes" } else { "no" }
        );
        if !summary.preview.is_empty() {
            println!("   Preview:");
            for line in &summary.preview {
                println!("     {}: {}", line.speaker, line.text);
            }
            let remaining = summary.lines.saturating_sub(summary.preview.len());
            if remaining > 0 {
                println!("     ... and {} more line(s)", remaining);
            }
        }
        if let Some(condition) = &summary.condition {
            println!("   Condition: {}", condition);
        }
        if args.flow {
            if let Some(dialog) = model.dialog(&summary.name) {
                println!("   Actions:");
                for action in &dialog.actions {
                    println!("     {}", action.display());
                }
            }
        }
    }
    Ok(0)
}

pub(crate) fn run_list_npcs(args: FileArgs) -> Result<i32, DaedalusError> {
    let (script, model) = load_model(&args.file)?;
    println!("NPCs in {}:", script.file_name());

    let npcs = npc_summaries(&model);
    if npcs.is_empty() {
        println!("  No NPC instances found.");
        return Ok(0);
    }
    for (index, npc) in npcs.iter().enumerate() {
        println!();
        println!("{}. {} ({})", index + 1, npc.name, npc.parent_type);
        if let Some(name) = &npc.display_name {
            println!("   Name: {}", name);
        }
        println!("   Dialogs: {}", npc.dialog_count);
    }
    Ok(0)
}

pub(crate) fn run_extract(args: ExtractArgs) -> Result<i32, DaedalusError> {
    let (_, model) = load_model(&args.file)?;
    let format = match args.format.as_deref() {
        Some(value) => OutputFormat::parse(value)?,
        None => OutputFormat::Json,
    };
    let view = extract_dialog(&model, &args.dialog)?;

    let content = match format {
        OutputFormat::Json => to_json(&DialogExtract { dialog: &view }, args.pretty)?,
        OutputFormat::Daedalus => {
            let options = generator_options(&args.generator);
            let mut sections = Vec::new();
            if let Some(dialog) = model.dialog(&view.name) {
                sections.push(generate_dialog(&model, dialog, &options));
                for key in ["condition", "information"] {
                    if let Some(function) = model.linked_function(dialog, key) {
                        sections.push(generate_function(function, &options));
                    }
                }
            }
            sections.join("\n\n")
        }
    };

    emit_content(args.output.as_deref(), &content, |path| {
        format!("Extracted dialog '{}' to {}", view.name, path)
    })?;
    Ok(0)
}

pub(crate) fn run_extract_npc(args: ExtractNpcArgs) -> Result<i32, DaedalusError> {
    let (_, model) = load_model(&args.file)?;
    let view = extract_npc(&model, &args.npc)?;
    let content = to_json(&NpcExtract { npc: &view }, args.pretty)?;
    emit_content(args.output.as_deref(), &content, |path| {
        format!(
            "Extracted NPC '{}' with {} dialog(s) to {}",
            view.name,
            view.dialogs.len(),
            path
        )
    })?;
    Ok(0)
}

pub(crate) fn run_edit(args: FileArgs) -> Result<i32, DaedalusError> {
    resolve_source_path(&args.file)?;
    println!("Interactive editing is not available from the command line.");
    println!("Convert the script to JSON, edit it, and convert it back:");
    println!();
    println!("1. daedalus-dialog convert {} {}.json --pretty", args.file, args.file);
    println!("2. Edit {}.json with any editor", args.file);
    println!(
        "3. daedalus-dialog convert {}.json {} --format daedalus",
        args.file, args.file
    );
    Ok(0)
}
