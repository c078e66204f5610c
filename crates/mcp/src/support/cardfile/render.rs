#![forbid(unsafe_code)]

use super::{CardFile, CardFileError, FrontMatterYaml, DELIMITER};

/// Inverse of `parse`: absent optional fields are omitted from the header
/// rather than serialized empty.
pub(crate) fn render(file: &CardFile) -> Result<String, CardFileError> {
    let fm = &file.front_matter;
    let constraints = match &fm.constraints {
        None => None,
        Some(value) => Some(serde_yaml::to_value(value).map_err(|err| {
            CardFileError(format!("constraints cannot be represented as YAML: {err}"))
        })?),
    };
    let header = FrontMatterYaml {
        key: fm.key.clone(),
        summary: fm.summary.clone(),
        status: fm.status,
        tags: fm.tags.clone(),
        keywords: fm.keywords.clone(),
        relations: fm.relations.clone(),
        code_links: fm.code_links.clone(),
        constraints,
    };
    let yaml = serde_yaml::to_string(&header)
        .map_err(|err| CardFileError(format!("front matter cannot be serialized: {err}")))?;
    Ok(format!(
        "{DELIMITER}\n{yaml}{DELIMITER}\n{body}",
        body = file.body
    ))
}
