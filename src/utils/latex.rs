//! # ROOT 标记文本转换
//!
//! 图中的文字沿用 ROOT TLatex 的写法（`#sqrt{s}`, `fb^{-1}`, `#chi^{2}`,
//! `#splitline{..}{..}` 等），绘制前转换为 Unicode 纯文本行。
//!
//! ## 依赖关系
//! - 被 `plot/` 模块使用
//! - 使用 `regex` crate

use regex::{Captures, Regex};
use std::sync::OnceLock;

struct Patterns {
    font: Regex,
    style: Regex,
    sqrt: Regex,
    symbol: Regex,
    superscript: Regex,
    subscript: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        font: Regex::new(r"#(?:font|scale|color)\[[^\]]*\]\{([^{}]*)\}").expect("static regex"),
        style: Regex::new(r"#(?:it|bf|rm|bold|mathrm)\{([^{}]*)\}").expect("static regex"),
        sqrt: Regex::new(r"#sqrt\{([^{}]*)\}").expect("static regex"),
        symbol: Regex::new(r"#([A-Za-z]+)").expect("static regex"),
        superscript: Regex::new(r"\^\{([^{}]*)\}").expect("static regex"),
        subscript: Regex::new(r"_\{([^{}]*)\}").expect("static regex"),
    })
}

/// 将 ROOT 标记文本转换为若干行 Unicode 文本
pub fn render_lines(text: &str) -> Vec<String> {
    split_lines(text).iter().map(|l| to_display_text(l)).collect()
}

/// 展开 `#splitline{A}{B}`（可嵌套）为多行
pub fn split_lines(text: &str) -> Vec<String> {
    const MARKER: &str = "#splitline";

    let Some(start) = text.find(MARKER) else {
        return vec![text.to_string()];
    };
    let prefix = &text[..start];
    let after = &text[start + MARKER.len()..];

    let Some((first, rest)) = take_group(after) else {
        return vec![text.to_string()];
    };
    let Some((second, suffix)) = take_group(rest) else {
        return vec![text.to_string()];
    };

    let mut lines = split_lines(first);
    lines.extend(split_lines(second));
    if let Some(head) = lines.first_mut() {
        head.insert_str(0, prefix);
    }
    if let Some(tail) = lines.last_mut() {
        tail.push_str(suffix);
    }
    lines
}

/// 从 `{` 开始截取一个配对的花括号组，返回 (组内文本, 剩余文本)
fn take_group(s: &str) -> Option<(&str, &str)> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&s[1..i], &s[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// 将单行 ROOT 标记文本转换为 Unicode
pub fn to_display_text(text: &str) -> String {
    let p = patterns();
    let mut out = text.to_string();

    // 由内向外剥离字体与样式标记
    loop {
        let next = {
            let stripped = p.font.replace_all(&out, "$1");
            p.style.replace_all(&stripped, "$1").into_owned()
        };
        if next == out {
            break;
        }
        out = next;
    }

    out = p
        .sqrt
        .replace_all(&out, |c: &Captures| {
            let arg = &c[1];
            if arg.chars().count() == 1 {
                format!("√{}", arg)
            } else {
                format!("√({})", arg)
            }
        })
        .into_owned();

    out = p
        .symbol
        .replace_all(&out, |c: &Captures| symbol_with_tail(&c[1]).unwrap_or_else(|| c[0].to_string()))
        .into_owned();

    out = p
        .superscript
        .replace_all(&out, |c: &Captures| {
            convert_chars(&c[1], superscript_char).unwrap_or_else(|| format!("^({})", &c[1]))
        })
        .into_owned();

    out = p
        .subscript
        .replace_all(&out, |c: &Captures| {
            convert_chars(&c[1], subscript_char).unwrap_or_else(|| c[1].to_string())
        })
        .into_owned();

    out
}

fn convert_chars(s: &str, map: fn(char) -> Option<char>) -> Option<String> {
    s.chars().map(map).collect()
}

/// 符号名后可能直接跟普通字母（`#intL`），取最长的已知前缀
fn symbol_with_tail(name: &str) -> Option<String> {
    (1..=name.len())
        .rev()
        .find_map(|end| symbol(&name[..end]).map(|s| format!("{}{}", s, &name[end..])))
}

fn symbol(name: &str) -> Option<&'static str> {
    let s = match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ε",
        "eta" => "η",
        "theta" => "θ",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "int" => "∫",
        "pm" => "±",
        "times" => "×",
        "leq" => "≤",
        "geq" => "≥",
        "rightarrow" => "→",
        "infty" => "∞",
        "sqrt" => "√",
        _ => return None,
    };
    Some(s)
}

fn superscript_char(c: char) -> Option<char> {
    let s = match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        ' ' => ' ',
        _ => return None,
    };
    Some(s)
}

fn subscript_char(c: char) -> Option<char> {
    let s = match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'o' => 'ₒ',
        'x' => 'ₓ',
        'h' => 'ₕ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'p' => 'ₚ',
        's' => 'ₛ',
        't' => 'ₜ',
        _ => return None,
    };
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cme_and_lumi() {
        assert_eq!(
            to_display_text("#sqrt{s}=13 TeV, 139 fb^{-1}"),
            "√s=13 TeV, 139 fb⁻¹"
        );
        assert_eq!(to_display_text("#scale[0.7]{#int}L dt"), "∫L dt");
    }

    #[test]
    fn test_fonts_and_greek() {
        assert_eq!(
            to_display_text("#font[72]{ATLAS} #font[42]{Internal}"),
            "ATLAS Internal"
        );
        assert_eq!(to_display_text("#chi^{2}"), "χ²");
        assert_eq!(to_display_text("#it{p}-value = 0.5"), "p-value = 0.5");
        assert_eq!(to_display_text("#unknown"), "#unknown");
    }

    #[test]
    fn test_subscripts_without_unicode_form() {
        assert_eq!(to_display_text("m_{jj} [TeV]"), "mjj [TeV]");
        assert_eq!(to_display_text("x_{0}"), "x₀");
        assert_eq!(to_display_text("10^{ab}"), "10^(ab)");
    }

    #[test]
    fn test_splitline_nested() {
        let lines = render_lines("#splitline{#it{p}-value = 0.1}{#splitline{Fit Range: 1 - 8 TeV}{|y*| < 0.6}}");
        assert_eq!(
            lines,
            vec![
                "p-value = 0.1".to_string(),
                "Fit Range: 1 - 8 TeV".to_string(),
                "|y*| < 0.6".to_string()
            ]
        );
    }

    #[test]
    fn test_splitline_unbalanced_kept() {
        assert_eq!(split_lines("#splitline{a}{b"), vec!["#splitline{a}{b".to_string()]);
        assert_eq!(split_lines("plain"), vec!["plain".to_string()]);
    }
}
