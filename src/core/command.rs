//! Command parser for the : command system

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Navigation
    Go(String),
    Back,
    Sidebar,
    Menu(String),

    // Table
    Search(String),
    Sort(String),
    PageSize(usize),
    Page(PageArg),
    Export,

    // Shell
    Reload,
    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Target of a `:page` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageArg {
    First,
    Prev,
    Next,
    Last,
    Number(usize),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let input = input.strip_prefix(':').unwrap_or(input).trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let unknown = || Command::Unknown(input.to_string());

    match cmd.to_lowercase().as_str() {
        // Navigation
        "go" | "open" | "route" => args.map(Command::Go).unwrap_or_else(unknown),
        "back" | "b" => Command::Back,
        "sidebar" | "sb" => Command::Sidebar,
        "menu" => args.map(Command::Menu).unwrap_or_else(unknown),

        // Table
        "search" | "find" | "filter" => Command::Search(args.unwrap_or_default()),
        "sort" => args.map(Command::Sort).unwrap_or_else(unknown),
        "pagesize" | "ps" | "rows" => args
            .and_then(|s| s.parse().ok())
            .map(Command::PageSize)
            .unwrap_or_else(unknown),
        "page" | "p" => args
            .as_deref()
            .and_then(parse_page_arg)
            .map(Command::Page)
            .unwrap_or_else(unknown),
        "export" | "csv" => Command::Export,

        // Shell
        "reload" | "retry" => Command::Reload,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,

        _ => unknown(),
    }
}

fn parse_page_arg(arg: &str) -> Option<PageArg> {
    match arg.to_lowercase().as_str() {
        "first" => Some(PageArg::First),
        "prev" | "previous" => Some(PageArg::Prev),
        "next" => Some(PageArg::Next),
        "last" => Some(PageArg::Last),
        other => other.parse().ok().map(PageArg::Number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation_commands() {
        assert_eq!(
            parse_command("go /reports/accumulated"),
            Command::Go("/reports/accumulated".to_string())
        );
        assert_eq!(parse_command(":back"), Command::Back);
        assert_eq!(parse_command("sb"), Command::Sidebar);
        assert_eq!(
            parse_command("menu reports"),
            Command::Menu("reports".to_string())
        );
        assert_eq!(parse_command("go"), Command::Unknown("go".to_string()));
    }

    #[test]
    fn test_parse_table_commands() {
        assert_eq!(
            parse_command("search ava lee"),
            Command::Search("ava lee".to_string())
        );
        assert_eq!(parse_command("search"), Command::Search(String::new()));
        assert_eq!(parse_command("sort age"), Command::Sort("age".to_string()));
        assert_eq!(parse_command("pagesize 20"), Command::PageSize(20));
        assert_eq!(parse_command("page next"), Command::Page(PageArg::Next));
        assert_eq!(parse_command("p 3"), Command::Page(PageArg::Number(3)));
        assert_eq!(parse_command("export"), Command::Export);
    }

    #[test]
    fn test_parse_shell_commands() {
        assert_eq!(parse_command("reload"), Command::Reload);
        assert_eq!(parse_command("HELP"), Command::Help);
        assert_eq!(parse_command("q"), Command::Quit);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_command("notacommand"),
            Command::Unknown("notacommand".to_string())
        );
        assert_eq!(
            parse_command("pagesize many"),
            Command::Unknown("pagesize many".to_string())
        );
    }
}
