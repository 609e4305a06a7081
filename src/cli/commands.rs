//! Command dispatch: resolves category names and calls the category service

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::CategoryService;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{expand_path, global_config_path, Settings};
use crate::domain::{Category, CategoryId, CategoryUpdate, NewCategory, SiblingSlot};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `popcat --help`".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(cli, command),
        command => {
            let container = ServiceContainer::new(load_settings(cli)?);
            debug!(catalog = %container.settings.catalog_file.display(), "container ready");
            dispatch(&container.categories, command)
        }
    }
}

/// Settings with the `-f/--file` override applied.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(file) = &cli.catalog_file {
        settings.catalog_file = PathBuf::from(expand_path(file.to_string_lossy().as_ref()));
    }
    Ok(settings)
}

fn dispatch(service: &CategoryService, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Add {
            name,
            parent,
            description,
            sort,
        } => cmd_add(service, name, parent.as_deref(), description.as_deref(), *sort),
        Commands::Edit {
            name,
            rename,
            description,
            clear_description,
            sort,
        } => cmd_edit(
            service,
            name,
            rename.as_deref(),
            description.as_deref(),
            *clear_description,
            *sort,
        ),
        // clap guarantees exactly one of a parent or --root
        Commands::Mv { name, parent, .. } => cmd_mv(service, name, parent.as_deref()),
        Commands::Reorder { name, sort_order } => {
            let id = id_of(service, name)?;
            let category = service.reorder(id, *sort_order)?;
            output::action("Reordered", &output::category_line(&category));
            Ok(())
        }
        Commands::Place {
            name,
            after,
            before,
        } => cmd_place(service, name, after.as_deref(), before.as_deref()),
        Commands::Renumber { parent } => cmd_renumber(service, parent.as_deref()),
        Commands::Activate { names } => cmd_set_active(service, names, true),
        Commands::Deactivate { names } => cmd_set_active(service, names, false),
        Commands::Rm { name } => {
            let id = id_of(service, name)?;
            let removed = service.delete(id)?;
            output::action("Deleted", &removed.name);
            Ok(())
        }
        Commands::Show { name } => cmd_show(service, name),
        Commands::Ancestors { name } => {
            let id = id_of(service, name)?;
            print_lines(&service.ancestors(id)?);
            Ok(())
        }
        Commands::Descendants { name } => {
            let id = id_of(service, name)?;
            print_lines(&service.descendants(id)?);
            Ok(())
        }
        Commands::List {
            roots,
            active,
            children_of,
        } => cmd_list(service, *roots, *active, children_of.as_deref()),
        Commands::Tree { active } => cmd_tree(service, *active),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn id_of(service: &CategoryService, name: &str) -> CliResult<CategoryId> {
    Ok(service.get_by_name(name)?.id)
}

fn print_lines(categories: &[Category]) {
    for category in categories {
        output::info(&output::category_line(category));
    }
}

#[instrument(level = "debug", skip(service))]
fn cmd_add(
    service: &CategoryService,
    name: &str,
    parent: Option<&str>,
    description: Option<&str>,
    sort: Option<f64>,
) -> CliResult<()> {
    let mut input = NewCategory::named(name);
    if let Some(parent) = parent {
        input = input.under(id_of(service, parent)?);
    }
    if let Some(description) = description {
        input = input.with_description(description);
    }
    if let Some(sort) = sort {
        input = input.with_sort_order(sort);
    }
    let category = service.create(input)?;
    output::action("Created", &category.name);
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn cmd_edit(
    service: &CategoryService,
    name: &str,
    rename: Option<&str>,
    description: Option<&str>,
    clear_description: bool,
    sort: Option<f64>,
) -> CliResult<()> {
    if rename.is_none() && description.is_none() && !clear_description && sort.is_none() {
        return Err(CliError::InvalidArgs(
            "nothing to change: give --rename, --description, --clear-description or --sort"
                .to_string(),
        ));
    }
    let current = service.get_by_name(name)?;
    let mut update = CategoryUpdate::from_current(&current);
    if let Some(rename) = rename {
        update.name = rename.to_string();
    }
    if clear_description {
        update.description = None;
    } else if let Some(description) = description {
        update.description = Some(description.to_string());
    }
    update.sort_order = sort;

    let category = service.update(current.id, update)?;
    output::action("Updated", &output::category_line(&category));
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn cmd_mv(service: &CategoryService, name: &str, parent: Option<&str>) -> CliResult<()> {
    let id = id_of(service, name)?;
    let new_parent = parent.map(|p| id_of(service, p)).transpose()?;
    let category = service.move_to(id, new_parent)?;
    match parent {
        Some(parent) => output::action("Moved", &format!("{} under {}", category.name, parent)),
        None => output::action("Moved", &format!("{} to the top level", category.name)),
    }
    Ok(())
}

#[instrument(level = "debug", skip(service))]
fn cmd_place(
    service: &CategoryService,
    name: &str,
    after: Option<&str>,
    before: Option<&str>,
) -> CliResult<()> {
    let id = id_of(service, name)?;
    let slot = match (after, before) {
        (Some(after), Some(before)) => SiblingSlot::Between {
            before: id_of(service, after)?,
            after: id_of(service, before)?,
        },
        (None, None) => SiblingSlot::Last,
        _ => {
            return Err(CliError::InvalidArgs(
                "--after and --before must be given together".to_string(),
            ))
        }
    };
    let category = service.place(id, slot)?;
    output::action("Placed", &output::category_line(&category));
    Ok(())
}

fn cmd_renumber(service: &CategoryService, parent: Option<&str>) -> CliResult<()> {
    let parent_id = parent.map(|p| id_of(service, p)).transpose()?;
    let children = service.renumber_children(parent_id)?;
    output::success(&format!("{} categories renumbered", children.len()));
    print_lines(&children);
    Ok(())
}

fn cmd_set_active(service: &CategoryService, names: &[String], active: bool) -> CliResult<()> {
    for name in names {
        let id = id_of(service, name)?;
        let category = if active {
            service.activate(id)?
        } else {
            service.deactivate(id)?
        };
        let label = if category.active { "Active" } else { "Inactive" };
        output::action(label, &category.name);
    }
    Ok(())
}

fn cmd_show(service: &CategoryService, name: &str) -> CliResult<()> {
    let id = id_of(service, name)?;
    let view = service.describe(id)?;
    let ancestors = service.ancestors(id)?;
    let category = &view.category;

    output::header(&category.name);
    output::field("id", &category.id);
    if let Some(description) = &category.description {
        output::field("description", description);
    }
    output::field("parent", view.parent_name.as_deref().unwrap_or("-"));
    if !ancestors.is_empty() {
        output::field("path", &output::breadcrumb(ancestors.iter()));
    }
    output::field("level", &view.level);
    output::field("children", &view.child_count);
    output::field("sort order", &category.sort_order);
    output::field("active", &category.active);
    output::field("deletable", &view.deletable);
    output::field("created", &category.created_at.to_rfc3339());
    output::field("updated", &category.updated_at.to_rfc3339());
    Ok(())
}

fn cmd_list(
    service: &CategoryService,
    roots: bool,
    active: bool,
    children_of: Option<&str>,
) -> CliResult<()> {
    let mut categories = match children_of {
        Some(parent) => service.list_children(Some(id_of(service, parent)?))?,
        None if roots && active => service.list_active_roots()?,
        None if active => service.list_active()?,
        None => service.get_tree(roots)?,
    };
    if active {
        categories.retain(|c| c.active);
    }
    if categories.is_empty() {
        output::warning("no categories");
    }
    print_lines(&categories);
    Ok(())
}

fn cmd_tree(service: &CategoryService, active_only: bool) -> CliResult<()> {
    let forest = service.forest(active_only)?;
    if forest.is_empty() {
        output::warning("catalog is empty");
        return Ok(());
    }
    for tree in forest.to_termtrees(output::tree_label) {
        output::info(&tree);
    }
    debug!(nodes = forest.len(), depth = forest.depth(), "tree rendered");
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unavailable)".to_string());
            output::field("global", &global);
            if let Some(config) = &cli.config {
                output::field("explicit", &config.display());
            }
            let settings = load_settings(cli)?;
            output::field("catalog", &settings.catalog_file.display());
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
