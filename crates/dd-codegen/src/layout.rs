/// Width of the `*` rule in dialog banners.
const BANNER_WIDTH: usize = 60;

/// Three-line comment banner naming a dialog.
pub fn section_banner(dialog_name: &str) -> Vec<String> {
    let rule = format!("// {}", "*".repeat(BANNER_WIDTH));
    vec![
        rule.clone(),
        format!("//\t\t\t\t\t{}", display_name(dialog_name)),
        rule,
    ]
}

/// `DIA_Npc_Topic` names show as `Topic`; shorter names show whole.
pub fn display_name(dialog_name: &str) -> String {
    let parts: Vec<&str> = dialog_name.split('_').collect();
    if parts.len() > 2 {
        parts[2..].join("_")
    } else {
        dialog_name.to_string()
    }
}

/// Prefixes every line of a possibly multi-line block.
pub fn indent_block(text: &str, indent: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect()
}

/// Replaces the leading tabs of every line with `unit`, so nested source
/// indentation follows the configured indent.
pub fn retab(text: &str, unit: &str) -> String {
    if unit == "\t" {
        return text.to_string();
    }
    text.lines()
        .map(|line| {
            let body = line.trim_start_matches('\t');
            format!("{}{}", unit.repeat(line.len() - body.len()), body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod layout_tests {
    use super::*;

    #[test]
    fn display_name_drops_prefix_and_npc() {
        assert_eq!(display_name("DIA_Hagen_Hallo_Again"), "Hallo_Again");
        assert_eq!(display_name("DIA_Hagen"), "DIA_Hagen");
    }

    #[test]
    fn banner_has_three_lines() {
        let banner = section_banner("DIA_Hagen_Hallo");
        assert_eq!(banner.len(), 3);
        assert_eq!(banner[0], banner[2]);
        assert_eq!(banner[1], "//\t\t\t\t\tHallo");
    }

    #[test]
    fn blank_lines_stay_unindented() {
        assert_eq!(
            indent_block("if (a)\n\n{", "\t"),
            vec!["\tif (a)", "", "\t{"]
        );
    }

    #[test]
    fn leading_tabs_follow_the_indent_unit() {
        assert_eq!(retab("if (a)\n{\n\t\tb = 1;\n};", "  "), "if (a)\n{\n    b = 1;\n};");
        assert_eq!(retab("x = \"\t\";", "    "), "x = \"\t\";");
        assert_eq!(retab("{\n\tb = 1;\n}", "\t"), "{\n\tb = 1;\n}");
    }
}
