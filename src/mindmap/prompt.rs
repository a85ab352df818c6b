/// Build the instruction sent to the model for `topic`.
///
/// The caller is responsible for rejecting empty topics. The template asks for raw JSON
/// with a `mapa` object (`nodes`, `edges`) and a top-level `resumo`.
pub fn build_prompt(topic: &str) -> String {
	format!(
		r#"Crie um mapa mental detalhado sobre o tema "{topic}".

Responda APENAS com JSON válido, sem texto adicional e sem blocos de código, exatamente no formato:
{{
  "mapa": {{
    "nodes": [
      {{ "id": "1", "position": {{ "x": 0, "y": 0 }}, "data": {{ "label": "Tema central", "descricao": "Explicação curta" }} }}
    ],
    "edges": [
      {{ "id": "e1-2", "source": "1", "target": "2" }}
    ]
  }},
  "resumo": "Resumo geral do tema"
}}

Regras:
- O nó com "id": "1" é o tema central "{topic}".
- Todo nó tem "id" único (string), "position" com coordenadas numéricas "x" e "y" espalhadas para não se sobreporem, e "data" com "label" curto e "descricao" de uma frase.
- Cada edge liga um "source" a um "target" usando ids de nós existentes.
- Gere entre 8 e 15 nós organizados em subtópicos.
- "resumo" descreve o tema de forma geral em no máximo 3 a 4 frases."#
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn embeds_topic_at_least_twice() {
		let topic = "Fotossíntese em plantas C4";
		let prompt = build_prompt(topic);
		assert!(prompt.matches(topic).count() >= 2);
	}

	#[test]
	fn requests_the_expected_keys() {
		let prompt = build_prompt("x");
		for key in ["\"mapa\"", "\"nodes\"", "\"edges\"", "\"resumo\"", "\"descricao\""] {
			assert!(prompt.contains(key), "missing {key}");
		}
	}

	#[test]
	fn is_deterministic() {
		assert_eq!(build_prompt("Rust"), build_prompt("Rust"));
	}

	#[test]
	fn keeps_braces_in_topic_verbatim() {
		let topic = "{weird} \"quoted\" topic";
		assert!(build_prompt(topic).matches(topic).count() >= 2);
	}
}
