//! Letter-driven menu for interactive sessions.
//!
//! Prompts with dialoguer and re-prompts on invalid input until the user
//! quits.

use std::io::{self, Write};

use anyhow::Result;
use console::style;
use dialoguer::{Input, theme::ColorfulTheme};

use modsync_core::commands::UpdateCommand;
use modsync_core::config::ServerKind;

use crate::report;

/// One menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    UpdateAll,
    UpdateMods,
    UpdateServer,
    CreateSymlinks,
    LowerCaseMods,
    CopyKeys,
    Quit,
}

const ARMA3_CHOICES: &[MenuChoice] = &[
    MenuChoice::UpdateAll,
    MenuChoice::UpdateMods,
    MenuChoice::UpdateServer,
    MenuChoice::CreateSymlinks,
    MenuChoice::LowerCaseMods,
    MenuChoice::CopyKeys,
    MenuChoice::Quit,
];

const REFORGER_CHOICES: &[MenuChoice] = &[MenuChoice::UpdateServer, MenuChoice::Quit];

impl MenuChoice {
    pub fn letter(self) -> char {
        match self {
            MenuChoice::UpdateAll => 'A',
            MenuChoice::UpdateMods => 'B',
            MenuChoice::UpdateServer => 'C',
            MenuChoice::CreateSymlinks => 'D',
            MenuChoice::LowerCaseMods => 'E',
            MenuChoice::CopyKeys => 'F',
            MenuChoice::Quit => 'Q',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::UpdateAll => "Update server and Mods",
            MenuChoice::UpdateMods => "Update Mods only",
            MenuChoice::UpdateServer => "Update Server only",
            MenuChoice::CreateSymlinks => "Create mod symlinks",
            MenuChoice::LowerCaseMods => "Lower case mods",
            MenuChoice::CopyKeys => "Copy key files",
            MenuChoice::Quit => "Quit/Log Out",
        }
    }

    /// Choices offered for a server, in menu order.
    pub fn available(server: ServerKind) -> &'static [MenuChoice] {
        match server {
            ServerKind::Arma3 => ARMA3_CHOICES,
            ServerKind::Reforger => REFORGER_CHOICES,
        }
    }

    /// Parse a letter (case-insensitive, surrounding whitespace ignored).
    pub fn parse(input: &str, server: ServerKind) -> Option<MenuChoice> {
        let mut chars = input.trim().chars();
        let letter = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() {
            return None;
        }
        Self::available(server)
            .iter()
            .copied()
            .find(|choice| choice.letter() == letter)
    }
}

/// "A, B, C or Q"
pub fn options_hint(server: ServerKind) -> String {
    let letters: Vec<String> = MenuChoice::available(server)
        .iter()
        .map(|c| c.letter().to_string())
        .collect();
    match letters.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => String::new(),
    }
}

/// Whether the session continues after a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run one choice and print its report.
pub fn dispatch<W: Write>(
    cmd: &UpdateCommand,
    choice: MenuChoice,
    mods_list: Option<&str>,
    writer: &mut W,
) -> Result<Flow> {
    match choice {
        MenuChoice::UpdateAll => {
            let report = cmd.update_all(mods_list)?;
            report::print_update_all(writer, &report)?;
        }
        MenuChoice::UpdateMods => {
            let report = cmd.update_mods(mods_list)?;
            report::print_update_mods(writer, &report)?;
        }
        MenuChoice::UpdateServer => {
            cmd.update_server()?;
            writeln!(
                writer,
                "{} {} server is up to date",
                style("✓").green(),
                cmd.server().display_name()
            )?;
        }
        MenuChoice::CreateSymlinks => {
            let report = cmd.create_links(mods_list)?;
            report::print_links(writer, &report)?;
        }
        MenuChoice::LowerCaseMods => {
            let report = cmd.normalize(mods_list)?;
            report::print_normalize(writer, &report)?;
        }
        MenuChoice::CopyKeys => {
            let report = cmd.copy_keys(mods_list)?;
            report::print_keys(writer, &report)?;
        }
        MenuChoice::Quit => {
            writeln!(writer)?;
            writeln!(writer, "Closing Program now")?;
            return Ok(Flow::Quit);
        }
    }
    writeln!(writer)?;
    Ok(Flow::Continue)
}

/// Interactive menu session.
pub struct Menu<W: Write = io::Stdout> {
    cmd: UpdateCommand,
    mods_list: Option<String>,
    writer: W,
    theme: ColorfulTheme,
}

impl Menu<io::Stdout> {
    pub fn new(cmd: UpdateCommand, mods_list: Option<String>) -> Self {
        Self {
            cmd,
            mods_list,
            writer: io::stdout(),
            theme: ColorfulTheme::default(),
        }
    }
}

impl<W: Write> Menu<W> {
    /// Prompt until the user quits.
    ///
    /// Operation errors are printed and the menu is shown again.
    pub fn run(&mut self) -> Result<()> {
        let server = self.cmd.server();
        loop {
            self.print_choices()?;
            let input: String = Input::with_theme(&self.theme)
                .with_prompt("Please enter your choice")
                .allow_empty(true)
                .interact_text()?;

            let Some(choice) = MenuChoice::parse(&input, server) else {
                writeln!(self.writer)?;
                writeln!(
                    self.writer,
                    "You must only select either {} to quit.",
                    options_hint(server)
                )?;
                writeln!(self.writer, "Please try again")?;
                continue;
            };

            match dispatch(&self.cmd, choice, self.mods_list.as_deref(), &mut self.writer) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(err) => {
                    writeln!(self.writer, "{} {:#}", style("Error:").red().bold(), err)?;
                    writeln!(self.writer)?;
                }
            }
        }
    }

    fn print_choices(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{}",
            style(format!("  {} server", self.cmd.server().display_name()))
                .bold()
                .cyan()
        )?;
        for choice in MenuChoice::available(self.cmd.server()) {
            writeln!(self.writer, "  {}: {}", choice.letter(), choice.label())?;
        }
        Ok(())
    }
}
