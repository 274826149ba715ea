use std::io::{Read, Write};

use fat_core::verify::ChainStatus;
use fat_core::{FatError, FileTable, Result, StoreConfig, verify};

use crate::presentation::menu::Menu;
use crate::presentation::prompt::{confirm, timestamp};

fn content_or_stdin(content: Option<String>) -> Result<String> {
    if let Some(c) = content {
        return Ok(c);
    }
    let mut buf = String::new();
    std::io::stdin().lock().read_to_string(&mut buf)?;
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}

fn confirmed(yes: bool, question: &str) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    let stdin = std::io::stdin();
    confirm(&mut stdin.lock(), &mut std::io::stderr(), question)
}

pub fn handle_shell(config: &StoreConfig) -> Result<()> {
    let mut table = FileTable::open(config)?;
    let stdin = std::io::stdin();
    Menu::new(&mut table, stdin.lock(), std::io::stdout().lock()).run()
}

pub fn handle_create(config: &StoreConfig, name: String, content: Option<String>) -> Result<()> {
    let content = content_or_stdin(content)?;
    let mut table = FileTable::open(config)?;
    let position = table.create(&name, &content)?;
    table.persist_all()?;
    let entry = table.entry(position)?;
    eprintln!(
        "create: {} ({} chars, {} segment(s)) -> {}",
        name,
        entry.total_length,
        table.allocator().segment_count(entry.total_length),
        entry.chain_start()
    );
    Ok(())
}

pub fn handle_ls(config: &StoreConfig, deleted: bool, long: bool) -> Result<()> {
    let table = FileTable::open(config)?;
    let mut out = std::io::stdout().lock();
    for row in table.list(deleted) {
        let e = row.entry;
        let when = if deleted {
            e.deleted_at.as_ref().map(timestamp).unwrap_or_default()
        } else {
            timestamp(&e.modified_at)
        };
        if long {
            writeln!(
                out,
                "{:>4}  {:>8}  {:>4}  {}  {:<24}  {}",
                row.index,
                e.total_length,
                table.allocator().segment_count(e.total_length),
                when,
                e.name,
                e.chain_start()
            )?;
        } else {
            writeln!(out, "{:>4}  {:>8}  {}  {}", row.index, e.total_length, when, e.name)?;
        }
    }
    Ok(())
}

pub fn handle_cat(config: &StoreConfig, index: usize) -> Result<()> {
    let table = FileTable::open(config)?;
    let opened = table.open_file(index)?;
    let mut out = std::io::stdout().lock();
    out.write_all(opened.content.as_bytes())?;
    writeln!(out)?;
    Ok(())
}

pub fn handle_edit(
    config: &StoreConfig,
    index: usize,
    content: Option<String>,
    yes: bool,
) -> Result<()> {
    let content = content_or_stdin(content)?;
    let mut table = FileTable::open(config)?;
    let position = table.resolve(index, false)?;
    let edit = table.stage_modify(position, content)?;
    let name = table.entry(position)?.name.clone();
    if !confirmed(yes, &format!("Save changes to '{name}'?"))? {
        eprintln!("edit: changes discarded");
        return Ok(());
    }
    table.commit_edit(edit)?;
    table.persist_all()?;
    eprintln!("edit: {name}");
    Ok(())
}

pub fn handle_rm(config: &StoreConfig, index: usize, yes: bool) -> Result<()> {
    let mut table = FileTable::open(config)?;
    let position = table.resolve(index, false)?;
    let name = table.entry(position)?.name.clone();
    if !confirmed(yes, &format!("Move '{name}' to the trash?"))? {
        eprintln!("rm: cancelled");
        return Ok(());
    }
    table.soft_delete(position)?;
    table.persist_all()?;
    eprintln!("rm: {name}");
    Ok(())
}

pub fn handle_recover(config: &StoreConfig, index: usize, yes: bool) -> Result<()> {
    let mut table = FileTable::open(config)?;
    let position = table.resolve(index, true)?;
    let name = table.entry(position)?.name.clone();
    if !confirmed(yes, &format!("Recover '{name}'?"))? {
        eprintln!("recover: cancelled");
        return Ok(());
    }
    table.restore(position)?;
    table.persist_all()?;
    eprintln!("recover: {name}");
    Ok(())
}

pub fn handle_verify(config: &StoreConfig) -> Result<()> {
    let table = FileTable::open(config)?;
    let report = verify(&table)?;
    for c in report.chains.iter().filter(|c| c.status != ChainStatus::Ok) {
        let state = if c.is_deleted { "deleted" } else { "live" };
        println!(
            "#{:<4} {:<24} {state:<7} segments={:<4} {:?}",
            c.position + 1,
            c.name,
            c.segments,
            c.status
        );
    }
    for orphan in &report.orphans {
        println!("orphan {orphan}");
    }
    if report.is_clean() {
        eprintln!("verify: OK ({} chain(s))", report.chains.len());
        Ok(())
    } else {
        Err(FatError::Integrity(format!(
            "{} damaged chain(s), {} orphan segment(s)",
            report
                .chains
                .iter()
                .filter(|c| c.status != ChainStatus::Ok)
                .count(),
            report.orphans.len()
        )))
    }
}
