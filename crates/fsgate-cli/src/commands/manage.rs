//! In-place mutations: mkdir, rename, rm, cp and mv.

use super::Manager;
use crate::cli::PathArgs;
use crate::cli::RenameArgs;
use crate::cli::TransferArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Result;

pub fn mkdir(args: &PathArgs, manager: &Manager, formatter: &dyn OutputFormatter) -> Result<()> {
    let created = add_path_context(manager.create_folder(&args.path), &args.path)?;
    formatter.format_done("mkdir", created.as_str())
}

pub fn rename(args: &RenameArgs, manager: &Manager, formatter: &dyn OutputFormatter) -> Result<()> {
    let renamed = add_path_context(manager.rename(&args.path, &args.new_name), &args.path)?;
    formatter.format_done("rename", renamed.as_str())
}

pub fn remove(args: &PathArgs, manager: &Manager, formatter: &dyn OutputFormatter) -> Result<()> {
    add_path_context(manager.delete(&args.path), &args.path)?;
    formatter.format_done("rm", &args.path)
}

pub fn copy(args: &TransferArgs, manager: &Manager, formatter: &dyn OutputFormatter) -> Result<()> {
    let copied = add_path_context(manager.copy(&args.src, &args.dest_dir), &args.src)?;
    formatter.format_done("cp", copied.as_str())
}

pub fn r#move(
    args: &TransferArgs,
    manager: &Manager,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let moved = add_path_context(manager.move_item(&args.src, &args.dest_dir), &args.src)?;
    formatter.format_done("mv", moved.as_str())
}
