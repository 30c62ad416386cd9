//! Numbered console menu for `watch --action menu`.
//!
//! Every new file gets the menu below. Actions write their outputs and mark
//! the file as processed. Choice 7 records the file right away and shows the
//! menu again, choice 8 leaves it for another session.
//!
//! ```text
//! 1. Split PDF
//! 2. Delete page
//! 3. Duplicate page
//! 4. Merge with another PDF from the input directory
//! 5. Extract text
//! 6. Decrypt
//! 7. Mark as processed and return to menu
//! 8. Skip
//! ```

use anyhow::{Context, ensure};
use std::io::{BufRead, Write};
use tracing::{error, info};

use pdfinator::config::Config;
use pdfinator::edit::{PageEdit, PageEditor};
use pdfinator::error::{PdfinatorError, Result};
use pdfinator::merge::Merger;
use pdfinator::watch::{
    ActionHandler, DirectoryScanner, FileHandler, HandleOutcome, ScannedFile, WatchAction,
};

const MENU: &str = "\
Choose an action:
1. Split PDF
2. Delete page
3. Duplicate page
4. Merge with another PDF from the input directory
5. Extract text
6. Decrypt
7. Mark as processed and return to menu
8. Skip";

const CHOICES: usize = 8;

/// Asks on the console what to do with each file.
///
/// Reads answers from `input` and writes prompts to `output`. End of input
/// cancels the watch session.
pub struct MenuHandler<R, W> {
    input: R,
    output: W,
    config: Config,
    editor: PageEditor,
    merger: Merger,
}

impl<R: BufRead, W: Write> MenuHandler<R, W> {
    /// Create a menu reading from `input` and prompting on `output`.
    pub fn new(input: R, output: W, config: &Config) -> Self {
        Self {
            input,
            output,
            config: config.clone(),
            editor: PageEditor::new(config),
            merger: Merger::new(config),
        }
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PdfinatorError::Cancelled);
        }
        Ok(line.trim().to_string())
    }

    /// Prompt until the answer is a number in `1..=max`.
    fn read_number(&mut self, prompt: &str, max: usize) -> Result<usize> {
        loop {
            let line = self.read_line(prompt)?;
            match parse_number(&line, max) {
                Ok(number) => return Ok(number),
                Err(err) => self.say(&format!("Invalid input: {err:#}"))?,
            }
        }
    }

    fn read_page(&mut self, prompt: &str) -> Result<u32> {
        let page = self.read_number(prompt, u32::MAX as usize)?;
        Ok(page as u32)
    }

    async fn run_action(&mut self, action: WatchAction, file: &ScannedFile) -> Result<()> {
        info!("Menu: {} for {}", action, file.id);
        ActionHandler::new(action.clone(), &self.config)
            .handle(file)
            .await?;
        self.say(&format!("Finished: {action}"))
    }

    async fn edit(&mut self, edit: PageEdit, file: &ScannedFile) -> Result<()> {
        info!("Menu: {} for {}", edit, file.id);
        let report = self.editor.apply(&file.path, edit).await?;
        self.say(&format!("Saved {}", report.output_path.display()))
    }

    /// Offer the other PDFs of the input directory and merge with the chosen
    /// one. Returns `false` when there is nothing to merge with.
    async fn merge(&mut self, file: &ScannedFile) -> Result<bool> {
        let others: Vec<ScannedFile> =
            DirectoryScanner::new(self.config.input_dir.clone(), self.config.recursive)
                .excluding(&self.config.output_dir)
                .excluding(&self.config.logs_dir)
                .scan()?
                .into_iter()
                .filter(|other| other.id != file.id)
                .collect();

        if others.is_empty() {
            info!("No other PDFs found for merging with {}", file.id);
            self.say("No other PDFs to merge with.")?;
            return Ok(false);
        }

        for (i, other) in others.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, other.id)?;
        }
        let index = self.read_number("Merge with", others.len())?;
        let other = &others[index - 1];

        info!("Menu: merge {} with {}", file.id, other.id);
        let inputs = [file.path.clone(), other.path.clone()];
        let report = self.merger.merge_files(&inputs, None).await?;
        self.say(&format!("Saved {}", report.output_path.display()))?;
        Ok(true)
    }

    /// Run one menu choice. `Ok(true)` means the file is finished.
    async fn perform(&mut self, choice: usize, file: &ScannedFile) -> Result<bool> {
        match choice {
            1 => {
                let pages_per_split = self.read_number("Pages per split", usize::MAX)?;
                self.run_action(WatchAction::Split { pages_per_split }, file)
                    .await?;
            }
            2 => {
                let page = self.read_page("Page number to delete")?;
                self.edit(PageEdit::Delete(page), file).await?;
            }
            3 => {
                let page = self.read_page("Page number to duplicate")?;
                self.edit(PageEdit::Duplicate(page), file).await?;
            }
            4 => return self.merge(file).await,
            5 => self.run_action(WatchAction::ExtractText, file).await?,
            6 => {
                let password = self.read_line("Password (empty to try the built-in list)")?;
                let password = (!password.is_empty()).then_some(password);
                self.run_action(WatchAction::Decrypt { password }, file)
                    .await?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl<R: BufRead, W: Write> FileHandler for MenuHandler<R, W> {
    async fn handle(&mut self, file: &ScannedFile) -> Result<HandleOutcome> {
        self.say(&format!("\nPDF detected: {}", file.id))?;
        let mut marked = false;

        loop {
            self.say(MENU)?;
            match self.read_number("Enter choice", CHOICES)? {
                7 => {
                    marked = true;
                    info!("User marked {} as processed", file.id);
                    self.say(&format!("{} marked as processed.", file.id))?;
                }
                8 => {
                    info!("User skipped {}", file.id);
                    self.say("Skipping.")?;
                    return Ok(if marked {
                        HandleOutcome::Done
                    } else {
                        HandleOutcome::Skipped
                    });
                }
                choice => match self.perform(choice, file).await {
                    Ok(true) => return Ok(HandleOutcome::Done),
                    Ok(false) => {}
                    Err(err) if err.is_recoverable() => {
                        error!("Menu action failed for {}: {}", file.id, err);
                        self.say(&format!("Error: {err}"))?;
                    }
                    Err(err) => return Err(err),
                },
            }
        }
    }
}

fn parse_number(input: &str, max: usize) -> anyhow::Result<usize> {
    let number: usize = input
        .parse()
        .with_context(|| format!("'{input}' is not a positive number"))?;
    ensure!(
        (1..=max).contains(&number),
        "expected a number between 1 and {max}"
    );
    Ok(number)
}
