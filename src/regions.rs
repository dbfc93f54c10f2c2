//! US state and territory codes to the regions used for grouping output.

/// Region for a two-letter code, case-insensitive. `DC` maps to the federal
/// region and `US` to national organizations.
pub fn region_for_state(code: &str) -> Option<&'static str> {
    let region = match code.trim().to_ascii_uppercase().as_str() {
        "AK" => "Alaska",
        "AZ" | "NM" | "TX" => "Southwest",
        "CA" | "NV" => "Pacific Southwest",
        "HI" => "Pacific",
        "ID" | "OR" | "WA" => "Pacific Northwest",
        "CO" | "MT" | "UT" | "WY" => "Mountain Plains",
        "OK" => "Oklahoma/Southern Plains",
        "IL" | "IN" | "IA" | "KS" | "MN" | "MO" | "NE" | "ND" | "OH" | "SD" => "Midwest",
        "MI" | "WI" => "Great Lakes",
        "AL" | "AR" | "FL" | "GA" | "KY" | "LA" | "MS" | "NC" | "SC" | "TN" | "VA" | "WV" => {
            "Southeast"
        }
        "CT" | "DE" | "ME" | "MD" | "MA" | "NH" | "NJ" | "NY" | "PA" | "RI" | "VT" => "Northeast",
        "DC" => "Mid-Atlantic",
        "US" => "National",
        _ => return None,
    };
    Some(region)
}
