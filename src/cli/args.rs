//! CLI argument parsing

/// Environment variable consulted when `--catalogue` is not given
pub const CATALOGUE_ENV: &str = "SNAPCAT_CATALOGUE";

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub catalogue: Option<String>,
    pub config: Option<String>,
    pub command: Command,
}

#[derive(Debug, Clone)]
pub enum Command {
    List(ListArgs),
    Show(ShowArgs),
    Create(CreateArgs),
    Delete(String),
    Duplicate(String),
    Install(String),
    Uninstall(String),
    Export(ExportArgs),
    Import(String),
    Search(SearchArgs),
}

#[derive(Debug, Clone)]
pub struct ListArgs {
    pub sort: String,
    pub reverse: bool,
    pub json: bool,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            sort: "name".to_string(),
            reverse: false,
            json: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShowArgs {
    pub id: String,
    pub json: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    pub name: String,
    pub dirs: Vec<String>,
    pub desc: String,
    pub author: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub id: String,
    pub dest: String,
    pub dirs_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub query: String,
    pub regex: bool,
    pub extensions: Vec<String>,
    pub ids: Vec<String>,
    pub json: bool,
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

/// Parse command line arguments (`args[0]` is the program name)
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut catalogue = None;
    let mut config = None;
    let mut i = 1;

    while i < args.len() && args[i].starts_with("--") {
        match args[i].as_str() {
            "--catalogue" => catalogue = Some(take_value(args, &mut i, "--catalogue")?.to_string()),
            "--config" => config = Some(take_value(args, &mut i, "--config")?.to_string()),
            other => return Err(format!("Unknown option: {other}")),
        }
        i += 1;
    }

    let Some(name) = args.get(i) else {
        return Err("No command specified".to_string());
    };
    let rest = &args[i + 1..];

    let command = match name.as_str() {
        "list" => Command::List(parse_list_args(rest)?),
        "show" => Command::Show(parse_show_args(rest)?),
        "create" => Command::Create(parse_create_args(rest)?),
        "delete" => Command::Delete(parse_single_id(rest, "delete")?),
        "duplicate" => Command::Duplicate(parse_single_id(rest, "duplicate")?),
        "install" => Command::Install(parse_single_id(rest, "install")?),
        "uninstall" => Command::Uninstall(parse_single_id(rest, "uninstall")?),
        "export" => Command::Export(parse_export_args(rest)?),
        "import" => Command::Import(parse_import_args(rest)?),
        "search" => Command::Search(parse_search_args(rest)?),
        other => return Err(format!("Unknown command: {other}")),
    };

    Ok(CliArgs {
        catalogue,
        config,
        command,
    })
}

fn parse_list_args(args: &[String]) -> Result<ListArgs, String> {
    let mut list_args = ListArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--sort" => list_args.sort = take_value(args, &mut i, "--sort")?.to_string(),
            "--reverse" => list_args.reverse = true,
            "--json" => list_args.json = true,
            other => return Err(format!("Unknown option: {other}")),
        }
        i += 1;
    }
    Ok(list_args)
}

fn parse_show_args(args: &[String]) -> Result<ShowArgs, String> {
    let mut id = String::new();
    let mut json = false;

    for arg in args {
        match arg.as_str() {
            "--json" => json = true,
            a if !a.starts_with("--") => {
                if id.is_empty() {
                    id = a.to_string();
                } else {
                    return Err(format!("Unexpected argument: {a}"));
                }
            }
            other => return Err(format!("Unknown option: {other}")),
        }
    }

    if id.is_empty() {
        return Err("Missing required argument: ID".to_string());
    }
    Ok(ShowArgs { id, json })
}

fn parse_single_id(args: &[String], command: &str) -> Result<String, String> {
    match args {
        [id] if !id.starts_with("--") => Ok(id.clone()),
        [] => Err(format!("{command}: missing required argument: ID")),
        [arg] => Err(format!("Unknown option: {arg}")),
        [_, extra, ..] => Err(format!("Unexpected argument: {extra}")),
    }
}

fn parse_create_args(args: &[String]) -> Result<CreateArgs, String> {
    let mut create_args = CreateArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--desc" => create_args.desc = take_value(args, &mut i, "--desc")?.to_string(),
            "--author" => {
                create_args.author = Some(take_value(args, &mut i, "--author")?.to_string());
            }
            "--tag" => create_args.tags.push(take_value(args, &mut i, "--tag")?.to_string()),
            arg if !arg.starts_with("--") => {
                if create_args.name.is_empty() {
                    create_args.name = arg.to_string();
                } else {
                    create_args.dirs.push(arg.to_string());
                }
            }
            other => return Err(format!("Unknown option: {other}")),
        }
        i += 1;
    }

    if create_args.name.is_empty() {
        return Err("Missing required argument: NAME".to_string());
    }
    if create_args.dirs.is_empty() {
        return Err("Missing required argument: DIR".to_string());
    }
    Ok(create_args)
}

fn parse_export_args(args: &[String]) -> Result<ExportArgs, String> {
    let mut positional = Vec::new();
    let mut dirs_only = false;

    for arg in args {
        match arg.as_str() {
            "--dirs-only" => dirs_only = true,
            a if !a.starts_with("--") => positional.push(a.to_string()),
            other => return Err(format!("Unknown option: {other}")),
        }
    }

    match <[String; 2]>::try_from(positional) {
        Ok([id, dest]) => Ok(ExportArgs {
            id,
            dest,
            dirs_only,
        }),
        Err(p) if p.len() < 2 => Err("Missing required arguments: ID DEST_DIR".to_string()),
        Err(p) => Err(format!("Unexpected argument: {}", p[2])),
    }
}

fn parse_import_args(args: &[String]) -> Result<String, String> {
    match args {
        [archive] if !archive.starts_with("--") => Ok(archive.clone()),
        [] => Err("Missing required argument: ARCHIVE".to_string()),
        [arg] => Err(format!("Unknown option: {arg}")),
        [_, extra, ..] => Err(format!("Unexpected argument: {extra}")),
    }
}

fn parse_search_args(args: &[String]) -> Result<SearchArgs, String> {
    let mut search_args = SearchArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--regex" => search_args.regex = true,
            "--json" => search_args.json = true,
            "--ext" => search_args
                .extensions
                .push(take_value(args, &mut i, "--ext")?.to_string()),
            "--id" => search_args.ids.push(take_value(args, &mut i, "--id")?.to_string()),
            arg if !arg.starts_with("--") => {
                if search_args.query.is_empty() {
                    search_args.query = arg.to_string();
                } else {
                    return Err(format!("Unexpected argument: {arg}"));
                }
            }
            other => return Err(format!("Unknown option: {other}")),
        }
        i += 1;
    }

    if search_args.query.is_empty() {
        return Err("Missing required argument: QUERY".to_string());
    }
    Ok(search_args)
}
