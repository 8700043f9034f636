//! Markdown → HTML.
//!
//! Block level: ATX and setext headings, paragraphs, fenced and indented code, block quotes,
//! bullet/ordered lists, horizontal rules, pipe tables. Inline: code spans, strong,
//! emphasis, strikethrough, links, images, autolinks, hard breaks. All text is
//! HTML-escaped.

pub fn to_html(src: &str) -> String {
    let lines: Vec<&str> = src.lines().collect();
    let mut out = Vec::new();
    render_blocks(&lines, &mut out);
    out.join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Blank,
    Heading,
    Fence,
    Rule,
    Quote,
    Bullet,
    Ordered,
    Indented,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    None,
    Left,
    Center,
    Right,
}

fn classify(line: &str) -> Block {
    if line.trim().is_empty() {
        return Block::Blank;
    }
    if indent_width(line) >= 4 {
        return Block::Indented;
    }

    let trimmed = line.trim_start();
    if parse_fence_marker(trimmed).is_some() {
        return Block::Fence;
    }
    if parse_heading(trimmed).is_some() {
        return Block::Heading;
    }
    // `* * *` 是分隔线而不是列表
    if is_horizontal_rule(trimmed) {
        return Block::Rule;
    }
    if trimmed.starts_with('>') {
        return Block::Quote;
    }
    if bullet_marker(trimmed).is_some() {
        return Block::Bullet;
    }
    if ordered_marker(trimmed).is_some() {
        return Block::Ordered;
    }
    Block::Text
}

fn render_blocks(lines: &[&str], out: &mut Vec<String>) {
    let mut i = 0;
    while i < lines.len() {
        i = match classify(lines[i]) {
            Block::Blank => i + 1,
            Block::Fence => render_fence(lines, i, out),
            Block::Heading => {
                if let Some((level, text)) = parse_heading(lines[i].trim_start()) {
                    out.push(format!("<h{level}>{}</h{level}>", render_inline(text)));
                }
                i + 1
            }
            Block::Rule => {
                out.push("<hr />".to_string());
                i + 1
            }
            Block::Quote => render_quote(lines, i, out),
            Block::Bullet => render_list(lines, i, false, out),
            Block::Ordered => render_list(lines, i, true, out),
            Block::Indented => render_indented_code(lines, i, out),
            Block::Text if is_table_start(lines, i) => render_table(lines, i, out),
            Block::Text => render_paragraph(lines, i, out),
        };
    }
}

fn render_paragraph(lines: &[&str], start: usize, out: &mut Vec<String>) -> usize {
    let mut i = start;
    let mut para: Vec<&str> = Vec::new();
    while i < lines.len() {
        // 紧跟在段落行下的 `===`/`---` 把上一行变成标题
        if let Some(level) = (i > start).then(|| setext_level(lines[i])).flatten() {
            let title = para.pop().unwrap_or_default();
            if !para.is_empty() {
                out.push(format!("<p>{}</p>", render_inline(para.join("\n").trim_end())));
            }
            out.push(format!("<h{level}>{}</h{level}>", render_inline(title.trim_end())));
            return i + 1;
        }
        let kind = classify(lines[i]);
        let continues = match kind {
            Block::Text => i == start || !is_table_start(lines, i),
            Block::Indented => i != start,
            _ => false,
        };
        if !continues {
            break;
        }
        para.push(lines[i].trim_start());
        i += 1;
    }
    out.push(format!("<p>{}</p>", render_inline(para.join("\n").trim_end())));
    i
}

fn render_fence(lines: &[&str], start: usize, out: &mut Vec<String>) -> usize {
    let Some((marker, run_len, info)) = parse_fence_marker(lines[start].trim_start()) else {
        return start + 1;
    };
    let lang = info.split_whitespace().next();

    let mut i = start + 1;
    let mut body = Vec::new();
    while i < lines.len() {
        let trimmed = lines[i].trim_start();
        if let Some((m, run, rest)) = parse_fence_marker(trimmed) {
            if m == marker && run >= run_len && rest.trim().is_empty() {
                i += 1;
                break;
            }
        }
        body.push(lines[i]);
        i += 1;
    }

    let class = lang
        .map(|l| format!(" class=\"language-{}\"", escape(l)))
        .unwrap_or_default();
    out.push(format!("<pre><code{class}>{}</code></pre>", code_body(&body)));
    i
}

fn render_indented_code(lines: &[&str], start: usize, out: &mut Vec<String>) -> usize {
    let mut i = start;
    let mut body = Vec::new();
    while i < lines.len() {
        match classify(lines[i]) {
            Block::Indented => body.push(strip_columns(lines[i], 4)),
            Block::Blank => body.push(""),
            _ => break,
        }
        i += 1;
    }
    while body.last().is_some_and(|l| l.trim().is_empty()) {
        body.pop();
    }
    out.push(format!("<pre><code>{}</code></pre>", code_body(&body)));
    i
}

fn code_body(lines: &[&str]) -> String {
    let mut html = String::new();
    for line in lines {
        escape_into(&mut html, line);
        html.push('\n');
    }
    html
}

fn render_quote(lines: &[&str], start: usize, out: &mut Vec<String>) -> usize {
    let mut i = start;
    let mut inner = Vec::new();
    while i < lines.len() {
        let trimmed = lines[i].trim_start();
        if let Some(rest) = trimmed.strip_prefix('>') {
            inner.push(rest.strip_prefix(' ').unwrap_or(rest));
        } else if classify(lines[i]) == Block::Text && i > start {
            // 惰性续行
            inner.push(trimmed);
        } else {
            break;
        }
        i += 1;
    }

    let mut blocks = Vec::new();
    render_blocks(&inner, &mut blocks);
    out.push(format!("<blockquote>\n{}\n</blockquote>", blocks.join("\n")));
    i
}

fn render_list(lines: &[&str], start: usize, ordered: bool, out: &mut Vec<String>) -> usize {
    let mut items: Vec<Vec<String>> = Vec::new();
    let mut first_number = 1;
    let mut content_indent = 0;
    let mut loose = false;
    let mut i = start;

    while i < lines.len() {
        let line = lines[i];
        let indent = indent_width(line);
        let trimmed = line.trim_start();

        if indent < 4 && (items.is_empty() || indent < content_indent) {
            if let Some((number, width)) = item_marker(trimmed, ordered) {
                if items.is_empty() {
                    first_number = number;
                }
                content_indent = indent + width;
                items.push(vec![trimmed[width..].to_string()]);
                i += 1;
                continue;
            }
        }

        if classify(line) == Block::Blank {
            let Some(next) = lines.get(i + 1) else {
                break;
            };
            if classify(next) == Block::Blank {
                break;
            }
            if indent_width(next) >= content_indent {
                if let Some(item) = items.last_mut() {
                    item.push(String::new());
                }
            } else if indent_width(next) < 4
                && item_marker(next.trim_start(), ordered).is_some()
            {
                loose = true;
            } else {
                break;
            }
            i += 1;
            continue;
        }

        let Some(item) = items.last_mut() else {
            break;
        };
        if indent >= content_indent {
            item.push(strip_columns(line, content_indent).to_string());
        } else if classify(line) == Block::Text && item.last().is_some_and(|l| !l.is_empty()) {
            item.push(trimmed.to_string());
        } else {
            break;
        }
        i += 1;
    }

    let open = match (ordered, first_number) {
        (false, _) => "<ul>".to_string(),
        (true, 1) => "<ol>".to_string(),
        (true, n) => format!("<ol start=\"{n}\">"),
    };
    let mut html = vec![open];
    for item in &items {
        html.push(render_list_item(item, loose));
    }
    html.push(if ordered { "</ol>" } else { "</ul>" }.to_string());
    out.push(html.join("\n"));
    i
}

fn render_list_item(item: &[String], loose: bool) -> String {
    let lines: Vec<&str> = item.iter().map(String::as_str).collect();
    let loose = loose || lines.iter().any(|l| l.trim().is_empty());

    if !loose && lines.first().is_some_and(|l| classify(l) == Block::Text) {
        // 紧凑列表：开头的文本不包 <p>
        let head_len = lines
            .iter()
            .skip(1)
            .position(|l| classify(l) != Block::Text)
            .map_or(lines.len(), |p| p + 1);
        let head = render_inline(lines[..head_len].join("\n").trim_end());
        let mut tail = Vec::new();
        render_blocks(&lines[head_len..], &mut tail);
        if tail.is_empty() {
            return format!("<li>{head}</li>");
        }
        return format!("<li>{head}\n{}</li>", tail.join("\n"));
    }

    let mut blocks = Vec::new();
    render_blocks(&lines, &mut blocks);
    format!("<li>\n{}\n</li>", blocks.join("\n"))
}

fn render_table(lines: &[&str], start: usize, out: &mut Vec<String>) -> usize {
    let header = split_row(lines[start]).unwrap_or_default();
    let aligns: Vec<Align> = split_row(lines[start + 1])
        .unwrap_or_default()
        .iter()
        .map(|cell| parse_alignment(cell).unwrap_or(Align::None))
        .collect();
    let columns = header.len();

    let mut html = vec!["<table>".to_string(), "<thead>".to_string()];
    html.push(table_row(&header, &aligns, "th"));
    html.push("</thead>".to_string());

    let mut i = start + 2;
    let mut body = Vec::new();
    while i < lines.len() {
        if classify(lines[i]) == Block::Blank {
            break;
        }
        let Some(mut cells) = split_row(lines[i]) else {
            break;
        };
        cells.resize(columns, String::new());
        body.push(table_row(&cells, &aligns, "td"));
        i += 1;
    }
    if !body.is_empty() {
        html.push("<tbody>".to_string());
        html.extend(body);
        html.push("</tbody>".to_string());
    }
    html.push("</table>".to_string());
    out.push(html.join("\n"));
    i
}

fn table_row(cells: &[String], aligns: &[Align], tag: &str) -> String {
    let mut row = vec!["<tr>".to_string()];
    for (col, cell) in cells.iter().enumerate() {
        let style = match aligns.get(col).copied().unwrap_or(Align::None) {
            Align::None => "",
            Align::Left => " style=\"text-align: left;\"",
            Align::Center => " style=\"text-align: center;\"",
            Align::Right => " style=\"text-align: right;\"",
        };
        row.push(format!("<{tag}{style}>{}</{tag}>", render_inline(cell)));
    }
    row.push("</tr>".to_string());
    row.join("\n")
}

fn is_table_start(lines: &[&str], start: usize) -> bool {
    let Some(separator) = lines.get(start + 1) else {
        return false;
    };
    let (Some(header), Some(separator)) = (split_row(lines[start]), split_row(separator)) else {
        return false;
    };
    !header.is_empty()
        && header.len() == separator.len()
        && separator.iter().all(|cell| parse_alignment(cell).is_some())
}

/// 按未转义的 `|` 切分表格行；首尾的 `|` 可省略
fn split_row(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    if !trimmed.contains('|') {
        return None;
    }
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = match inner.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => inner,
    };

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(ch),
        }
    }
    cells.push(cell.trim().to_string());
    Some(cells)
}

fn parse_alignment(cell: &str) -> Option<Align> {
    let trimmed = cell.trim();
    let left = trimmed.starts_with(':');
    let right = trimmed.ends_with(':') && trimmed.len() > 1;
    let core = trimmed.trim_matches(':');
    if core.is_empty() || !core.chars().all(|ch| ch == '-') {
        return None;
    }
    Some(match (left, right) {
        (false, false) => Align::None,
        (true, false) => Align::Left,
        (false, true) => Align::Right,
        (true, true) => Align::Center,
    })
}

fn parse_fence_marker(trimmed: &str) -> Option<(u8, usize, &str)> {
    let bytes = trimmed.as_bytes();
    let marker = *bytes.first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let run_len = bytes.iter().take_while(|b| **b == marker).count();
    if run_len < 3 {
        return None;
    }
    let info = &trimmed[run_len..];
    if marker == b'`' && info.contains('`') {
        return None;
    }
    Some((marker, run_len, info))
}

fn parse_heading(trimmed: &str) -> Option<(usize, &str)> {
    let hashes = trimmed.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with(&[' ', '\t'][..]) {
        return None;
    }
    let text = rest.trim();
    // 结尾的 `#` 序列前面必须是空白
    let closed = text.trim_end_matches('#');
    let text = if closed.is_empty() || closed.ends_with(&[' ', '\t'][..]) {
        closed.trim_end()
    } else {
        text
    };
    Some((hashes, text))
}

fn setext_level(line: &str) -> Option<usize> {
    if indent_width(line) >= 4 {
        return None;
    }
    let trimmed = line.trim();
    let level = match trimmed.as_bytes().first()? {
        b'=' => 1,
        b'-' => 2,
        _ => return None,
    };
    let marker = if level == 1 { '=' } else { '-' };
    trimmed.chars().all(|c| c == marker).then_some(level)
}

fn is_horizontal_rule(trimmed: &str) -> bool {
    let Some(marker) = trimmed.chars().next() else {
        return false;
    };
    if !matches!(marker, '-' | '*' | '_') {
        return false;
    }
    let count = trimmed.chars().filter(|c| *c == marker).count();
    count >= 3 && trimmed.chars().all(|c| c == marker || c == ' ' || c == '\t')
}

/// `-`/`*`/`+` 加空白；返回内容起始偏移
fn bullet_marker(trimmed: &str) -> Option<usize> {
    let bytes = trimmed.as_bytes();
    if !matches!(*bytes.first()?, b'-' | b'*' | b'+') {
        return None;
    }
    marker_width(trimmed, 1)
}

/// `1.` 或 `1)` 加空白；返回 (序号, 内容起始偏移)
fn ordered_marker(trimmed: &str) -> Option<(u64, usize)> {
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    if !matches!(*trimmed.as_bytes().get(digits)?, b'.' | b')') {
        return None;
    }
    let number = trimmed[..digits].parse().ok()?;
    Some((number, marker_width(trimmed, digits + 1)?))
}

fn item_marker(trimmed: &str, ordered: bool) -> Option<(u64, usize)> {
    if ordered {
        ordered_marker(trimmed)
    } else {
        bullet_marker(trimmed).map(|width| (1, width))
    }
}

fn marker_width(trimmed: &str, marker_len: usize) -> Option<usize> {
    let rest = &trimmed[marker_len..];
    if rest.is_empty() {
        return Some(marker_len);
    }
    if !rest.starts_with(&[' ', '\t'][..]) {
        return None;
    }
    let spaces = rest.bytes().take_while(|b| *b == b' ').count().clamp(1, 4);
    Some(marker_len + spaces)
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => break,
        }
    }
    width
}

/// 去掉最多 `columns` 列的前导空白
fn strip_columns(line: &str, columns: usize) -> &str {
    let mut width = 0;
    for (idx, ch) in line.char_indices() {
        if width >= columns {
            return &line[idx..];
        }
        match ch {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => return &line[idx..],
        }
    }
    ""
}

// ---------------------------------------------------------------------------
// Inline
// ---------------------------------------------------------------------------

fn render_inline(src: &str) -> String {
    let mut out = String::with_capacity(src.len() + 16);
    let bytes = src.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\\' if i + 1 < len && bytes[i + 1].is_ascii_punctuation() => {
                escape_into(&mut out, &src[i + 1..i + 2]);
                i += 2;
                continue;
            }
            b'`' => {
                if let Some((content, end)) = parse_code_span(src, i) {
                    out.push_str("<code>");
                    escape_into(&mut out, content);
                    out.push_str("</code>");
                    i = end;
                    continue;
                }
                // 没有闭合：整段反引号按字面输出
                let run = bytes[i..].iter().take_while(|b| **b == b'`').count();
                out.push_str(&src[i..i + run]);
                i += run;
                continue;
            }
            marker @ (b'*' | b'_') => {
                if let Some((html, end)) = parse_emphasis(src, i, marker) {
                    out.push_str(&html);
                    i = end;
                    continue;
                }
            }
            b'~' if bytes.get(i + 1) == Some(&b'~') => {
                if let Some((content, end)) = find_closing(src, i + 2, "~~") {
                    out.push_str("<del>");
                    out.push_str(&render_inline(content));
                    out.push_str("</del>");
                    i = end;
                    continue;
                }
            }
            b'!' if bytes.get(i + 1) == Some(&b'[') => {
                if let Some(link) = parse_link(src, i + 1) {
                    out.push_str("<img alt=\"");
                    escape_into(&mut out, link.text);
                    out.push_str("\" src=\"");
                    escape_into(&mut out, link.dest);
                    out.push('"');
                    push_title(&mut out, link.title);
                    out.push_str(" />");
                    i = link.end;
                    continue;
                }
            }
            b'[' => {
                if let Some(link) = parse_link(src, i) {
                    out.push_str("<a href=\"");
                    escape_into(&mut out, link.dest);
                    out.push('"');
                    push_title(&mut out, link.title);
                    out.push('>');
                    out.push_str(&render_inline(link.text));
                    out.push_str("</a>");
                    i = link.end;
                    continue;
                }
            }
            b'<' => {
                if let Some((url, end)) = parse_autolink(src, i) {
                    out.push_str("<a href=\"");
                    escape_into(&mut out, url);
                    out.push_str("\">");
                    escape_into(&mut out, url);
                    out.push_str("</a>");
                    i = end;
                    continue;
                }
            }
            b' ' => {
                let run = bytes[i..].iter().take_while(|b| **b == b' ').count();
                if run >= 2 && bytes.get(i + run) == Some(&b'\n') {
                    out.push_str("<br />\n");
                    i += run + 1;
                    continue;
                }
            }
            _ => {}
        }

        let ch_len = src[i..].chars().next().map_or(1, char::len_utf8);
        escape_into(&mut out, &src[i..i + ch_len]);
        i += ch_len;
    }

    out
}

/// `***x***` → strong+em，`**x**`/`__x__` → strong，`*x*`/`_x_` → em；`_` 不在单词内部生效
fn parse_emphasis(src: &str, start: usize, marker: u8) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    if marker == b'_' && start > 0 && is_word_byte(bytes[start - 1]) {
        return None;
    }

    let run = bytes[start..].iter().take_while(|b| **b == marker).count();
    if run == 3 {
        let closing = if marker == b'*' { "***" } else { "___" };
        if let Some((content, end)) = find_closing(src, start + 3, closing) {
            let flanked = !content.starts_with(char::is_whitespace)
                && !content.ends_with(char::is_whitespace);
            let word_after = marker == b'_' && bytes.get(end).copied().is_some_and(is_word_byte);
            if flanked && !word_after {
                return Some((
                    format!("<strong><em>{}</em></strong>", render_inline(content)),
                    end,
                ));
            }
        }
    }

    let double = bytes.get(start + 1) == Some(&marker);
    let (content, end, tag) = if double {
        let closing = if marker == b'*' { "**" } else { "__" };
        let (content, end) = find_closing(src, start + 2, closing)?;
        (content, end, "strong")
    } else {
        let (content, end) = find_closing_single(src, start + 1, marker)?;
        (content, end, "em")
    };

    if content.starts_with(char::is_whitespace) || content.ends_with(char::is_whitespace) {
        return None;
    }
    if marker == b'_' && bytes.get(end).copied().is_some_and(is_word_byte) {
        return None;
    }
    Some((format!("<{tag}>{}</{tag}>", render_inline(content)), end))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b >= 0x80
}

fn find_closing<'a>(src: &'a str, start: usize, marker: &str) -> Option<(&'a str, usize)> {
    let rest = src.get(start..)?;
    let pos = rest.find(marker)?;
    if pos == 0 {
        return None;
    }
    Some((&rest[..pos], start + pos + marker.len()))
}

/// 单字符标记的闭合位置，跳过成对出现的双标记
fn find_closing_single(src: &str, start: usize, marker: u8) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    let mut j = start;
    while j < bytes.len() {
        if bytes[j] == marker {
            if bytes.get(j + 1) == Some(&marker) {
                j += 2;
                continue;
            }
            if j == start {
                return None;
            }
            return Some((&src[start..j], j + 1));
        }
        j += 1;
    }
    None
}

fn parse_code_span(src: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    let marker_len = bytes[start..].iter().take_while(|b| **b == b'`').count();
    let content_start = start + marker_len;

    let mut i = content_start;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let run_len = bytes[i..].iter().take_while(|b| **b == b'`').count();
        if run_len == marker_len {
            let content = &src[content_start..i];
            // 两端各去掉一个空格，方便写 `` `x` ``
            let content = match content.strip_prefix(' ').and_then(|c| c.strip_suffix(' ')) {
                Some(inner) if !inner.trim().is_empty() => inner,
                _ => content,
            };
            return Some((content, i + marker_len));
        }
        i += run_len;
    }
    None
}

struct Link<'a> {
    text: &'a str,
    dest: &'a str,
    title: Option<&'a str>,
    end: usize,
}

fn parse_link(src: &str, start: usize) -> Option<Link<'_>> {
    let bytes = src.as_bytes();
    if bytes.get(start).copied() != Some(b'[') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = start + 1;
    let text_end = loop {
        match *bytes.get(i)? {
            b'\\' => i += 2,
            b'[' => {
                depth += 1;
                i += 1;
            }
            b']' if depth == 0 => break i,
            b']' => {
                depth -= 1;
                i += 1;
            }
            _ => i += 1,
        }
    };
    if bytes.get(text_end + 1).copied() != Some(b'(') {
        return None;
    }

    let dest_start = text_end + 2;
    let mut paren_depth = 0usize;
    let mut j = dest_start;
    let dest_end = loop {
        match *bytes.get(j)? {
            b'\\' => j += 2,
            b'(' => {
                paren_depth += 1;
                j += 1;
            }
            b')' if paren_depth == 0 => break j,
            b')' => {
                paren_depth -= 1;
                j += 1;
            }
            _ => j += 1,
        }
    };

    let inner = src[dest_start..dest_end].trim();
    let (dest, title) = match inner.split_once(char::is_whitespace) {
        Some((dest, rest)) => {
            let rest = rest.trim();
            let title = rest
                .strip_prefix('"')
                .and_then(|t| t.strip_suffix('"'))
                .or_else(|| rest.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')));
            (dest, title)
        }
        None => (inner, None),
    };
    let dest = dest
        .strip_prefix('<')
        .and_then(|d| d.strip_suffix('>'))
        .unwrap_or(dest);

    Some(Link {
        text: &src[start + 1..text_end],
        dest,
        title,
        end: dest_end + 1,
    })
}

fn parse_autolink(src: &str, start: usize) -> Option<(&str, usize)> {
    let rest = src.get(start + 1..)?;
    let close = rest.find('>')?;
    let url = &rest[..close];
    let is_url = ["http://", "https://", "mailto:", "ftp://"]
        .iter()
        .any(|scheme| url.starts_with(scheme));
    if !is_url || url.contains(char::is_whitespace) {
        return None;
    }
    Some((url, start + 1 + close + 1))
}

fn push_title(out: &mut String, title: Option<&str>) {
    if let Some(title) = title {
        out.push_str(" title=\"");
        escape_into(out, title);
        out.push('"');
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/preview/markdown.rs"]
mod tests;
