use super::types::ColumnSelection;

pub const CVE_KEYWORDS: &[&str] = &["cve"];
pub const FILE_KEYWORDS: &[&str] = &["arquivo", "arquivos", "file", "files"];
pub const STATUS_KEYWORDS: &[&str] = &["vulnerab", "vulnerability", "vuln"];

/// First header whose lowercased text contains a keyword. Keywords are tried
/// in priority order: every column is scanned for the first keyword before
/// the next keyword is considered.
pub fn find_column<'a>(headers: &'a [String], keywords: &[&str]) -> Option<&'a str> {
    let lowered: Vec<String> = headers.iter().map(|header| header.to_lowercase()).collect();
    for keyword in keywords {
        for (idx, header) in lowered.iter().enumerate() {
            if header.contains(keyword) {
                return Some(headers[idx].as_str());
            }
        }
    }
    None
}

pub fn detect_columns(headers: &[String]) -> ColumnSelection {
    ColumnSelection {
        cve: find_column(headers, CVE_KEYWORDS).map(str::to_string),
        files: find_column(headers, FILE_KEYWORDS).map(str::to_string),
        status: find_column(headers, STATUS_KEYWORDS).map(str::to_string),
    }
}

/// Collapse a raw status cell into the fixed vocabulary. Unmatched values
/// pass through uppercased and trimmed.
pub fn normalize_status(raw: &str) -> String {
    let value = raw.trim().to_uppercase();
    match value.as_str() {
        "YES" | "Y" | "TRUE" | "SIM" => "YES".to_string(),
        "NO" | "N" | "FALSE" | "NAO" | "NÃO" => "NO".to_string(),
        "N/A" | "NA" | "N A" | "" => "N/A".to_string(),
        other if other.starts_with("ERROR") => "ERROR".to_string(),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn normalizes_yes_variants() {
        for raw in ["YES", "y", "True", " sim "] {
            assert_eq!(normalize_status(raw), "YES");
        }
    }

    #[test]
    fn normalizes_no_variants() {
        for raw in ["no", "N", "FALSE", "NAO", "não"] {
            assert_eq!(normalize_status(raw), "NO");
        }
    }

    #[test]
    fn normalizes_error_values_and_prefixes() {
        assert_eq!(normalize_status("error"), "ERROR");
        assert_eq!(normalize_status("ERROR: timeout after 30s"), "ERROR");
    }

    #[test]
    fn normalizes_missing_variants() {
        for raw in ["N/A", "na", "n a", "", "   "] {
            assert_eq!(normalize_status(raw), "N/A");
        }
    }

    #[test]
    fn passes_through_unknown_values() {
        assert_eq!(normalize_status(" partial "), "PARTIAL");
        assert_eq!(normalize_status("Inconclusive"), "INCONCLUSIVE");
    }

    #[test]
    fn is_idempotent_on_its_own_output() {
        for raw in ["Yes", "nao", "ERROR: x", "", "Partial"] {
            let once = normalize_status(raw);
            assert_eq!(normalize_status(&once), once);
        }
    }

    #[test]
    fn finds_first_header_in_original_order() {
        let cols = headers(&["Arquivo Afetado", "CVE ID", "Vulnerabilidade?"]);
        assert_eq!(find_column(&cols, &["cve"]), Some("CVE ID"));
    }

    #[test]
    fn keyword_priority_wins_over_column_order() {
        let cols = headers(&["Resultado", "Arquivos Impactados", "Files"]);
        assert_eq!(find_column(&cols, &["file", "arquivo"]), Some("Files"));
    }

    #[test]
    fn returns_none_without_a_match() {
        let cols = headers(&["Modelo", "Resultado"]);
        assert_eq!(find_column(&cols, STATUS_KEYWORDS), None);
    }

    #[test]
    fn detect_columns_reports_missing_headers_as_none() {
        let cols = headers(&["Vulnerabilidade Encontrada"]);
        let selection = detect_columns(&cols);
        assert_eq!(selection.cve, None);
        assert_eq!(selection.files, None);
        assert_eq!(selection.status.as_deref(), Some("Vulnerabilidade Encontrada"));
    }
}
