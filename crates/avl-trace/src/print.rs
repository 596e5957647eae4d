//! Box-drawing tree dump.

/// Renders one child subtree given the indentation of its own children.
pub type PrintChild<'a> = dyn Fn(&str) -> String + 'a;

/// Joins child renderings under a parent line.
///
/// Trailing `None` children are dropped; the last present child gets the
/// closing `└─` branch.
pub fn print_tree(tab: Option<&str>, children: &[Option<&PrintChild<'_>>]) -> String {
    let tab = tab.unwrap_or("");
    let mut out = String::new();

    let Some(last) = children.iter().rposition(Option::is_some) else {
        return out;
    };

    for (i, child_opt) in children.iter().enumerate().take(last + 1) {
        let Some(child_fn) = *child_opt else {
            continue;
        };

        let is_last = i == last;
        let child_tab = format!("{tab}{}  ", if is_last { " " } else { "│" });
        let child = child_fn(&child_tab);
        let branch = if child.is_empty() {
            "│"
        } else if is_last {
            "└─"
        } else {
            "├─"
        };

        out.push('\n');
        out.push_str(tab);
        out.push_str(branch);
        if !child.is_empty() {
            out.push(' ');
            out.push_str(&child);
        }
    }

    out
}
