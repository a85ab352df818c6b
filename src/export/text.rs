//! Text measurement and encoding for the built-in Helvetica font.

/// Approximate Helvetica advance width of `c`, in em.
fn char_width(c: char) -> f32 {
	match c {
		' ' | 'i' | 'j' | 'l' | '.' | ',' | ';' | ':' | '\'' | '|' | '!' | 'I' => 0.278,
		'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.333,
		'm' | 'M' | 'W' => 0.833,
		'w' => 0.722,
		c if c.is_uppercase() => 0.667,
		_ => 0.556,
	}
}

/// Width of `text` set at `size` points.
pub fn text_width(text: &str, size: f32) -> f32 {
	text.chars().map(char_width).sum::<f32>() * size
}

/// Greedy word wrap so that no line is wider than `max_width` points.
///
/// Words wider than a full line are split at character boundaries.
pub fn wrap(text: &str, size: f32, max_width: f32) -> Vec<String> {
	let mut lines = Vec::new();
	for paragraph in text.lines() {
		let mut line = String::new();
		for word in paragraph.split_whitespace() {
			let candidate = if line.is_empty() {
				word.to_string()
			} else {
				format!("{line} {word}")
			};
			if text_width(&candidate, size) <= max_width {
				line = candidate;
				continue;
			}
			if !line.is_empty() {
				lines.push(std::mem::take(&mut line));
			}
			for c in word.chars() {
				line.push(c);
				if text_width(&line, size) > max_width && line.chars().count() > 1 {
					line.pop();
					lines.push(std::mem::take(&mut line));
					line.push(c);
				}
			}
		}
		lines.push(line);
	}
	// `str::lines` yields nothing for an empty string.
	if lines.is_empty() {
		lines.push(String::new());
	}
	lines
}

/// Encode `text` as WinAnsi bytes for a standard Type 1 font.
pub fn win_ansi(text: &str) -> Vec<u8> {
	text.chars()
		.map(|c| match c {
			'\u{20}'..='\u{7e}' => c as u8,
			'\u{a0}'..='\u{ff}' => c as u32 as u8,
			'€' => 0x80,
			'…' => 0x85,
			'‘' => 0x91,
			'’' => 0x92,
			'“' => 0x93,
			'”' => 0x94,
			'•' => 0x95,
			'–' => 0x96,
			'—' => 0x97,
			_ => b'?',
		})
		.collect()
}

/// File-name friendly form of `topic`: lowercase ASCII words joined by `-`.
pub fn slug(topic: &str) -> String {
	let mut out = String::new();
	for c in topic.chars().map(fold_accent) {
		if c.is_ascii_alphanumeric() {
			out.push(c.to_ascii_lowercase());
		} else if !out.is_empty() && !out.ends_with('-') {
			out.push('-');
		}
	}
	let out: String = out.chars().take(60).collect();
	out.trim_end_matches('-').to_string()
}

fn fold_accent(c: char) -> char {
	match c {
		'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
		'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
		'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
		'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
		'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
		'ç' | 'Ç' => 'c',
		'ñ' | 'Ñ' => 'n',
		c => c,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wrapped_lines_fit() {
		let text = "Fotossíntese é o processo pelo qual plantas convertem luz em energia química armazenada.";
		let lines = wrap(text, 12.0, 150.0);
		assert!(lines.len() > 1);
		for line in &lines {
			assert!(text_width(line, 12.0) <= 150.0, "{line:?} too wide");
		}
		assert_eq!(lines.join(" "), text);
	}

	#[test]
	fn long_word_is_split() {
		let lines = wrap(&"a".repeat(100), 10.0, 50.0);
		assert!(lines.len() > 1);
		assert!(lines.iter().all(|l| text_width(l, 10.0) <= 50.0));
		assert_eq!(lines.concat().len(), 100);
	}

	#[test]
	fn keeps_paragraph_breaks() {
		assert_eq!(wrap("um\ndois", 12.0, 500.0), vec!["um", "dois"]);
		assert_eq!(wrap("", 12.0, 500.0), vec![""]);
	}

	#[test]
	fn encodes_latin_text() {
		assert_eq!(win_ansi("ação"), vec![b'a', 0xe7, 0xe3, b'o']);
		assert_eq!(win_ansi("•"), vec![0x95]);
		assert_eq!(win_ansi("日"), vec![b'?']);
	}

	#[test]
	fn slugs_topics() {
		assert_eq!(slug("Revolução Francesa!"), "revolucao-francesa");
		assert_eq!(slug("  ???  "), "");
	}
}
