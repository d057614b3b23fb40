//! Form contracts for the create/edit endpoints.
//!
//! State codes and genres are closed enumerations; free-form input is
//! mapped onto them and unknown values are rejected. Validation runs
//! before anything reaches the store.

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Constants ──────────────────────────────────────────────────────────

/// Phone numbers must be dash-separated: NNN-NNN-NNNN.
const PHONE_PATTERN: &str = r"^\d{3}-\d{3}-\d{4}$";

// ─── Closed enumerations ────────────────────────────────────────────────

/// Two-letter US state codes accepted by the listing forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsState {
    AL, AK, AZ, AR, CA, CO, CT, DE, DC, FL, GA, HI, ID, IL, IN, IA, KS, KY,
    LA, ME, MT, NE, NV, NH, NJ, NM, NY, NC, ND, OH, OK, OR, MD, MA, MI, MN,
    MS, MO, PA, RI, SC, SD, TN, TX, UT, VT, VA, WA, WV, WI, WY,
}

impl UsState {
    pub const ALL: [UsState; 51] = [
        UsState::AL, UsState::AK, UsState::AZ, UsState::AR, UsState::CA,
        UsState::CO, UsState::CT, UsState::DE, UsState::DC, UsState::FL,
        UsState::GA, UsState::HI, UsState::ID, UsState::IL, UsState::IN,
        UsState::IA, UsState::KS, UsState::KY, UsState::LA, UsState::ME,
        UsState::MT, UsState::NE, UsState::NV, UsState::NH, UsState::NJ,
        UsState::NM, UsState::NY, UsState::NC, UsState::ND, UsState::OH,
        UsState::OK, UsState::OR, UsState::MD, UsState::MA, UsState::MI,
        UsState::MN, UsState::MS, UsState::MO, UsState::PA, UsState::RI,
        UsState::SC, UsState::SD, UsState::TN, UsState::TX, UsState::UT,
        UsState::VT, UsState::VA, UsState::WA, UsState::WV, UsState::WI,
        UsState::WY,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UsState::AL => "AL", UsState::AK => "AK", UsState::AZ => "AZ",
            UsState::AR => "AR", UsState::CA => "CA", UsState::CO => "CO",
            UsState::CT => "CT", UsState::DE => "DE", UsState::DC => "DC",
            UsState::FL => "FL", UsState::GA => "GA", UsState::HI => "HI",
            UsState::ID => "ID", UsState::IL => "IL", UsState::IN => "IN",
            UsState::IA => "IA", UsState::KS => "KS", UsState::KY => "KY",
            UsState::LA => "LA", UsState::ME => "ME", UsState::MT => "MT",
            UsState::NE => "NE", UsState::NV => "NV", UsState::NH => "NH",
            UsState::NJ => "NJ", UsState::NM => "NM", UsState::NY => "NY",
            UsState::NC => "NC", UsState::ND => "ND", UsState::OH => "OH",
            UsState::OK => "OK", UsState::OR => "OR", UsState::MD => "MD",
            UsState::MA => "MA", UsState::MI => "MI", UsState::MN => "MN",
            UsState::MS => "MS", UsState::MO => "MO", UsState::PA => "PA",
            UsState::RI => "RI", UsState::SC => "SC", UsState::SD => "SD",
            UsState::TN => "TN", UsState::TX => "TX", UsState::UT => "UT",
            UsState::VT => "VT", UsState::VA => "VA", UsState::WA => "WA",
            UsState::WV => "WV", UsState::WI => "WI", UsState::WY => "WY",
        }
    }

    pub fn parse(input: &str) -> Option<UsState> {
        Self::ALL.iter().find(|s| s.as_str() == input).copied()
    }
}

/// The closed set of genre names a venue or artist can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreName {
    Alternative,
    Blues,
    Classical,
    Country,
    Electronic,
    Folk,
    Funk,
    HipHop,
    HeavyMetal,
    Instrumental,
    Jazz,
    MusicalTheatre,
    Pop,
    Punk,
    RnB,
    Reggae,
    RockNRoll,
    Soul,
    Other,
}

impl GenreName {
    pub const ALL: [GenreName; 19] = [
        GenreName::Alternative,
        GenreName::Blues,
        GenreName::Classical,
        GenreName::Country,
        GenreName::Electronic,
        GenreName::Folk,
        GenreName::Funk,
        GenreName::HipHop,
        GenreName::HeavyMetal,
        GenreName::Instrumental,
        GenreName::Jazz,
        GenreName::MusicalTheatre,
        GenreName::Pop,
        GenreName::Punk,
        GenreName::RnB,
        GenreName::Reggae,
        GenreName::RockNRoll,
        GenreName::Soul,
        GenreName::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GenreName::Alternative => "Alternative",
            GenreName::Blues => "Blues",
            GenreName::Classical => "Classical",
            GenreName::Country => "Country",
            GenreName::Electronic => "Electronic",
            GenreName::Folk => "Folk",
            GenreName::Funk => "Funk",
            GenreName::HipHop => "Hip-Hop",
            GenreName::HeavyMetal => "Heavy Metal",
            GenreName::Instrumental => "Instrumental",
            GenreName::Jazz => "Jazz",
            GenreName::MusicalTheatre => "Musical Theatre",
            GenreName::Pop => "Pop",
            GenreName::Punk => "Punk",
            GenreName::RnB => "R&B",
            GenreName::Reggae => "Reggae",
            GenreName::RockNRoll => "Rock n Roll",
            GenreName::Soul => "Soul",
            GenreName::Other => "Other",
        }
    }

    pub fn parse(input: &str) -> Option<GenreName> {
        Self::ALL.iter().find(|g| g.as_str() == input).copied()
    }
}

/// The choice lists served by the create-form endpoints.
#[derive(Debug, Serialize)]
pub struct FormChoices {
    pub states: Vec<&'static str>,
    pub genres: Vec<&'static str>,
}

pub fn form_choices() -> FormChoices {
    FormChoices {
        states: UsState::ALL.iter().map(|s| s.as_str()).collect(),
        genres: GenreName::ALL.iter().map(|g| g.as_str()).collect(),
    }
}

// ─── Forms ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub genres: Vec<String>,
    #[serde(default)]
    pub website_link: Option<String>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub seeking_talent: bool,
    #[serde(default)]
    pub seeking_description: Option<String>,
}

impl VenueForm {
    pub fn validate(&self) -> Result<(), String> {
        require("name", &self.name)?;
        require("city", &self.city)?;
        require("address", &self.address)?;
        validate_state(&self.state)?;
        validate_phone(&self.phone)?;
        validate_genres(&self.genres)?;
        validate_link("website_link", &self.website_link)?;
        validate_link("facebook_link", &self.facebook_link)?;
        validate_link("image_link", &self.image_link)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Vec<String>,
    #[serde(default)]
    pub website_link: Option<String>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub seeking_venue: bool,
    #[serde(default)]
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn validate(&self) -> Result<(), String> {
        require("name", &self.name)?;
        require("city", &self.city)?;
        validate_state(&self.state)?;
        validate_phone(&self.phone)?;
        validate_genres(&self.genres)?;
        validate_link("website_link", &self.website_link)?;
        validate_link("facebook_link", &self.facebook_link)?;
        validate_link("image_link", &self.image_link)?;
        Ok(())
    }
}

/// A booking submission. Field presence and timestamp shape are
/// enforced by deserialization.
#[derive(Debug, Deserialize)]
pub struct ShowForm {
    pub artist_id: Uuid,
    pub venue_id: Uuid,
    pub start_time: chrono::DateTime<chrono::FixedOffset>,
}

// ─── Field validators ───────────────────────────────────────────────────

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

fn validate_state(state: &str) -> Result<(), String> {
    UsState::parse(state)
        .map(|_| ())
        .ok_or_else(|| format!("'{state}' is not a two-letter US state code"))
}

fn validate_phone(phone: &str) -> Result<(), String> {
    let re = Regex::new(PHONE_PATTERN).map_err(|e| format!("invalid phone regex: {e}"))?;
    if !re.is_match(phone) {
        return Err(format!("phone '{phone}' must match NNN-NNN-NNNN"));
    }
    Ok(())
}

fn validate_genres(genres: &[String]) -> Result<(), String> {
    if genres.is_empty() {
        return Err("at least one genre is required".to_string());
    }
    for genre in genres {
        if GenreName::parse(genre).is_none() {
            return Err(format!("'{genre}' is not a known genre"));
        }
    }
    Ok(())
}

/// Link fields are optional, but must parse as URLs when given.
fn validate_link(field: &str, value: &Option<String>) -> Result<(), String> {
    match value.as_deref() {
        None | Some("") => Ok(()),
        Some(v) => {
            url::Url::parse(v).map_err(|_| format!("{field} is not a valid URL: '{v}'"))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue_form() -> VenueForm {
        VenueForm {
            name: "The Musical Hop".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            phone: "123-123-1234".into(),
            genres: vec!["Jazz".into(), "Reggae".into()],
            website_link: Some("https://www.themusicalhop.com".into()),
            facebook_link: None,
            image_link: None,
            seeking_talent: true,
            seeking_description: Some("Looking for a local artist.".into()),
        }
    }

    // ── enumerations ──────────────────────────────────────────────────

    #[test]
    fn test_state_parse_known_codes() {
        assert_eq!(UsState::parse("NY"), Some(UsState::NY));
        assert_eq!(UsState::parse("DC"), Some(UsState::DC));
        assert_eq!(UsState::parse("ZZ"), None);
        assert_eq!(UsState::parse("ny"), None);
    }

    #[test]
    fn test_state_enumeration_is_closed() {
        assert_eq!(UsState::ALL.len(), 51);
        for state in UsState::ALL {
            assert_eq!(UsState::parse(state.as_str()), Some(state));
        }
    }

    #[test]
    fn test_genre_parse_known_names() {
        assert_eq!(GenreName::parse("Hip-Hop"), Some(GenreName::HipHop));
        assert_eq!(GenreName::parse("R&B"), Some(GenreName::RnB));
        assert_eq!(GenreName::parse("Rock n Roll"), Some(GenreName::RockNRoll));
        assert_eq!(GenreName::parse("Dubstep"), None);
    }

    #[test]
    fn test_genre_enumeration_is_closed() {
        assert_eq!(GenreName::ALL.len(), 19);
        for genre in GenreName::ALL {
            assert_eq!(GenreName::parse(genre.as_str()), Some(genre));
        }
    }

    #[test]
    fn test_form_choices_cover_both_enumerations() {
        let choices = form_choices();
        assert_eq!(choices.states.len(), 51);
        assert_eq!(choices.genres.len(), 19);
        assert!(choices.genres.contains(&"Musical Theatre"));
    }

    // ── venue form validation ─────────────────────────────────────────

    #[test]
    fn test_valid_venue_form_passes() {
        assert!(venue_form().validate().is_ok());
    }

    #[test]
    fn test_phone_without_dashes_fails() {
        let mut form = venue_form();
        form.phone = "1234567890".into();
        let err = form.validate().unwrap_err();
        assert!(err.contains("NNN-NNN-NNNN"));
    }

    #[test]
    fn test_dashed_phone_passes() {
        let mut form = venue_form();
        form.phone = "123-456-7890".into();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_unknown_state_fails() {
        let mut form = venue_form();
        form.state = "XX".into();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_empty_genres_fails() {
        let mut form = venue_form();
        form.genres.clear();
        let err = form.validate().unwrap_err();
        assert!(err.contains("at least one genre"));
    }

    #[test]
    fn test_unknown_genre_fails() {
        let mut form = venue_form();
        form.genres.push("Vaporwave".into());
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_malformed_link_fails() {
        let mut form = venue_form();
        form.facebook_link = Some("not a url".into());
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_empty_link_is_allowed() {
        let mut form = venue_form();
        form.website_link = Some(String::new());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_blank_name_fails() {
        let mut form = venue_form();
        form.name = "   ".into();
        assert!(form.validate().is_err());
    }

    // ── artist form ───────────────────────────────────────────────────

    #[test]
    fn test_artist_form_deserializes_minimal_body() {
        let json = r#"{
            "name": "Guns N Petals",
            "city": "San Francisco",
            "state": "CA",
            "phone": "326-123-5000",
            "genres": ["Rock n Roll"]
        }"#;
        let form: ArtistForm = serde_json::from_str(json).unwrap();
        assert!(form.validate().is_ok());
        assert!(!form.seeking_venue);
        assert!(form.website_link.is_none());
    }

    // ── show form ─────────────────────────────────────────────────────

    #[test]
    fn test_show_form_requires_start_time() {
        let json = format!(
            r#"{{"artist_id": "{}", "venue_id": "{}"}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        assert!(serde_json::from_str::<ShowForm>(&json).is_err());
    }

    #[test]
    fn test_show_form_parses_rfc3339_timestamp() {
        let json = format!(
            r#"{{"artist_id": "{}", "venue_id": "{}", "start_time": "2035-05-21T21:30:00+00:00"}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let form: ShowForm = serde_json::from_str(&json).unwrap();
        assert_eq!(form.start_time.to_rfc3339(), "2035-05-21T21:30:00+00:00");
    }
}
