#![forbid(unsafe_code)]

use super::{CardFile, CardFileError, CardFrontMatter, FrontMatterYaml, DELIMITER, MAX_FILE_BYTES};

pub(crate) fn parse(raw: &str) -> Result<CardFile, CardFileError> {
    if raw.len() > MAX_FILE_BYTES {
        return Err(CardFileError(
            "card file exceeds safe read size".to_string(),
        ));
    }

    let (header, body) = split_file(raw)?;

    let yaml: FrontMatterYaml = serde_yaml::from_str(header)
        .map_err(|err| CardFileError(format!("front matter is not valid: {err}")))?;

    let constraints = match yaml.constraints {
        None => None,
        Some(value) => Some(serde_json::to_value(&value).map_err(|err| {
            CardFileError(format!("constraints cannot be represented as JSON: {err}"))
        })?),
    };

    if yaml.key.trim().is_empty() {
        return Err(CardFileError("front matter key is required".to_string()));
    }

    Ok(CardFile {
        front_matter: CardFrontMatter {
            key: yaml.key,
            summary: yaml.summary,
            status: yaml.status,
            tags: yaml.tags,
            keywords: yaml.keywords,
            relations: yaml.relations,
            code_links: yaml.code_links,
            constraints,
        },
        body: body.to_string(),
    })
}

/// Splits `---\n<yaml>\n---\n<body>` on whole delimiter lines. The body
/// keeps its text verbatim (minus the delimiter's own newline).
fn split_file(raw: &str) -> Result<(&str, &str), CardFileError> {
    let mut lines = raw.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Err(CardFileError("card file is empty".to_string()));
    };
    if first.trim_end() != DELIMITER {
        return Err(CardFileError(
            "card file must begin with a --- front matter delimiter".to_string(),
        ));
    }

    let mut offset = first.len();
    let header_start = offset;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let header = &raw[header_start..offset];
            let body = &raw[offset + line.len()..];
            return Ok((header, body));
        }
        offset += line.len();
    }
    Err(CardFileError(
        "card file is missing the closing --- delimiter".to_string(),
    ))
}
