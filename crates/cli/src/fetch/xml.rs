//! Just enough XML slicing for the catalog API responses: attribute-bearing
//! elements, no nesting of a tag inside itself, no CDATA.

/// All blocks for `tag`, each spanning `<tag ...>` through `</tag>` (or the
/// self-closing `/>`). A delimiter check keeps `item` from matching `items`.
pub fn blocks<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = Vec::new();
    let mut from = 0;

    while let Some(rel) = s[from..].find(&open) {
        let start = from + rel;
        let after = start + open.len();

        match s[after..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => {}
            _ => {
                from = after;
                continue;
            }
        }

        let Some(open_end_rel) = s[start..].find('>') else {
            break;
        };
        let open_end = start + open_end_rel + 1;

        if s[start..open_end].ends_with("/>") {
            out.push(&s[start..open_end]);
            from = open_end;
        } else if let Some(close_rel) = s[open_end..].find(&close) {
            let end = open_end + close_rel + close.len();
            out.push(&s[start..end]);
            from = end;
        } else {
            from = open_end;
        }
    }

    out
}

/// Value of `name="..."` inside the opening tag of `block`.
pub fn attr(block: &str, name: &str) -> Option<String> {
    let open_end = block.find('>').map_or(block.len(), |i| i + 1);
    let tag = &block[..open_end];
    let pattern = format!("{name}=\"");
    let mut from = 0;

    while let Some(rel) = tag[from..].find(&pattern) {
        let start = from + rel;
        let value_start = start + pattern.len();

        // Attribute names must start after whitespace, otherwise `id="` would
        // match inside `objectid="`.
        let boundary_ok =
            start > 0 && tag[..start].ends_with(|c: char| c.is_whitespace());
        if boundary_ok {
            let value_end = tag[value_start..].find('"')? + value_start;
            return Some(decode_entities(&tag[value_start..value_end]));
        }

        from = value_start;
    }

    None
}

/// Attribute of the first `tag` child inside `block`.
pub fn child_attr(block: &str, tag: &str, name: &str) -> Option<String> {
    blocks(block, tag).first().and_then(|b| attr(b, name))
}

pub fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&#10;", "\n")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
