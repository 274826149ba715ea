use std::io::{BufRead, Write};

use fat_core::{FatError, FileTable, Result};

use super::prompt::{ask, confirm, read_line, timestamp};

/// Interactive front end over a [`FileTable`]. Exit, or end of input,
/// persists the catalog exactly once.
pub struct Menu<'t, R, W> {
    table: &'t mut FileTable,
    input: R,
    output: W,
}

impl<'t, R: BufRead, W: Write> Menu<'t, R, W> {
    pub fn new(table: &'t mut FileTable, input: R, output: W) -> Self {
        Self {
            table,
            input,
            output,
        }
    }

    pub fn run(mut self) -> Result<()> {
        loop {
            self.print_menu()?;
            let Some(choice) = read_line(&mut self.input)? else {
                break;
            };
            let outcome = match choice.trim() {
                "1" => self.create(),
                "2" => self.list_live(),
                "3" => self.open(),
                "4" => self.modify(),
                "5" => self.delete(),
                "6" => self.recover(),
                "7" => {
                    writeln!(self.output, "Exiting...")?;
                    break;
                }
                _ => {
                    writeln!(self.output, "Invalid option.")?;
                    Ok(())
                }
            };
            match outcome {
                Ok(()) => {}
                Err(e @ FatError::InvalidSelection { .. }) => {
                    writeln!(self.output, "Invalid selection: {e}")?;
                }
                Err(e) => return Err(e),
            }
        }
        self.table.persist_all()
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "FAT file system")?;
        writeln!(self.output, "1. Create a file")?;
        writeln!(self.output, "2. List files")?;
        writeln!(self.output, "3. Open a file")?;
        writeln!(self.output, "4. Modify a file")?;
        writeln!(self.output, "5. Delete a file")?;
        writeln!(self.output, "6. Recover a file")?;
        writeln!(self.output, "7. Exit")?;
        write!(self.output, "Select an option: ")?;
        self.output.flush()?;
        Ok(())
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        Ok(ask(&mut self.input, &mut self.output, question)?.unwrap_or_default())
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        confirm(&mut self.input, &mut self.output, question)
    }

    /// Read a 1-based index and map it through the matching listing.
    fn select(&mut self, verb: &str, deleted: bool) -> Result<usize> {
        let raw = self.ask(&format!("Number of the file to {verb}: "))?;
        let index = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| FatError::invalid_selection(0, format!("'{}' is not a number", raw.trim())))?;
        self.table.resolve(index, deleted)
    }

    fn create(&mut self) -> Result<()> {
        let name = self.ask("File name: ")?;
        let capacity = self.table.allocator().capacity();
        let content = self.ask(&format!("Content (stored {capacity} characters per segment): "))?;
        self.table.create(&name, &content)?;
        writeln!(self.output, "File created.")?;
        Ok(())
    }

    fn list_live(&mut self) -> Result<()> {
        writeln!(self.output, "Files:")?;
        for row in self.table.list(false) {
            let e = row.entry;
            writeln!(
                self.output,
                "{}. {} - {} characters, created {}, modified {}",
                row.index,
                e.name,
                e.total_length,
                timestamp(&e.created_at),
                timestamp(&e.modified_at)
            )?;
        }
        Ok(())
    }

    fn list_trash(&mut self) -> Result<()> {
        writeln!(self.output, "Trash:")?;
        for row in self.table.list(true) {
            let e = row.entry;
            let deleted = e.deleted_at.as_ref().map(timestamp).unwrap_or_default();
            writeln!(
                self.output,
                "{}. {} - {} characters, deleted {}",
                row.index, e.name, e.total_length, deleted
            )?;
        }
        Ok(())
    }

    fn show(&mut self, position: usize) -> Result<()> {
        let content = self.table.read(position)?;
        let e = self.table.entry(position)?;
        writeln!(
            self.output,
            "{} - {} characters, created {}, modified {}",
            e.name,
            e.total_length,
            timestamp(&e.created_at),
            timestamp(&e.modified_at)
        )?;
        writeln!(self.output, "Content:")?;
        writeln!(self.output, "{content}")?;
        writeln!(self.output, "End of file.")?;
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        self.list_live()?;
        let position = self.select("open", false)?;
        self.show(position)
    }

    fn modify(&mut self) -> Result<()> {
        self.list_live()?;
        let position = self.select("modify", false)?;
        self.show(position)?;
        let content = self.ask("New content: ")?;
        let edit = self.table.stage_modify(position, content)?;
        if self.confirm("Save changes?")? {
            self.table.commit_edit(edit)?;
            writeln!(self.output, "File modified.")?;
        } else {
            writeln!(self.output, "Changes discarded.")?;
        }
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        self.list_live()?;
        let position = self.select("delete", false)?;
        let name = self.table.entry(position)?.name.clone();
        if self.confirm(&format!("Move '{name}' to the trash?"))? {
            self.table.soft_delete(position)?;
            writeln!(self.output, "File moved to the trash.")?;
        } else {
            writeln!(self.output, "Deletion cancelled.")?;
        }
        Ok(())
    }

    fn recover(&mut self) -> Result<()> {
        self.list_trash()?;
        let position = self.select("recover", true)?;
        let name = self.table.entry(position)?.name.clone();
        if self.confirm(&format!("Recover '{name}'?"))? {
            self.table.restore(position)?;
            writeln!(self.output, "File recovered.")?;
        } else {
            writeln!(self.output, "Recovery cancelled.")?;
        }
        Ok(())
    }
}
