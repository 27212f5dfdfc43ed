//! Prompt builders and reply schemas for each game step.
//!
//! Every prompt pins the exact JSON shape the oracle must answer with; the
//! matching schema struct on this side is what the sanitizer parses into.

use serde::Deserialize;

use crate::domain::game::{GuessedItems, TrackKey};

/// Fixed presenter persona, prepended as the system message of every
/// conversation with the oracle.
pub fn presenter_persona() -> &'static str {
    "You are the host of a music blind test game. You play song clips and ask \
     the participants to guess the song title and the artist. Before the game \
     starts you settle on a theme with the player, then you run the rounds. \
     Congratulate correct answers and encourage the player after wrong ones. \
     Never propose the same clip twice in one evening. If a rule is unclear, \
     give a quick, simple explanation. Keep a lively, energetic radio-host \
     tone, stay casual and punchy, and introduce each clip with a catchy \
     line. You are a spoken assistant: stay concise, under 250 tokens per \
     reply."
}

/// Opening message for a brand new game.
pub fn welcome_message() -> &'static str {
    "The player just started the game. Welcome them and invite them to pick \
     a theme for this round."
}

/// Instruction for extracting the chosen theme.
///
/// Expected reply: [`ThemeReply`].
pub fn theme_instruction() -> &'static str {
    "The player is choosing a theme for the blind test. Extract the chosen \
     theme and repeat it in your reply, then tell the player they can start \
     the round from the interface. If the player does not know, pick a theme \
     for them. Answer with a single concise JSON object in exactly this \
     format:\n\
     {\n\
       \"text\": \"What the presenter should say.\",\n\
       \"theme\": \"The chosen theme\"\n\
     }\n\
     For example:\n\
     {\n\
       \"text\": \"The 80s, love it! Hit the button whenever you're ready!\",\n\
       \"theme\": \"80s\"\n\
     }"
}

/// Instruction for proposing the next clip.
///
/// Expected reply: [`ClipReply`].
pub fn clip_instruction(theme: &str) -> String {
    format!(
        "The player chose the theme {theme}. Answer with a single concise \
         JSON object in exactly this format:\n\
         {{\n\
           \"text\": \"What the presenter should say.\",\n\
           \"extract\": {{\n\
             \"artist\": \"Artist name\",\n\
             \"title\": \"Song title\"\n\
           }}\n\
         }}\n\
         For example:\n\
         {{\n\
           \"text\": \"Here comes the first clip, get ready!\",\n\
           \"extract\": {{\n\
             \"artist\": \"Kenny Loggins\",\n\
             \"title\": \"Footloose\"\n\
           }}\n\
         }}"
    )
}

/// Per-attempt request for a clip, listing session and process exclusions.
pub fn clip_request(turn: u32, already_played: &str, unavailable: &str) -> String {
    let played = if already_played.is_empty() {
        "none so far"
    } else {
        already_played
    };
    let mut request = format!(
        "Propose a song clip matching the theme. This is round {turn} of the \
         game. Do not replay songs you already played: {played}."
    );
    if !unavailable.is_empty() {
        request.push_str(&format!(
            " Do not use these songs, they are unavailable: {unavailable}."
        ));
    }
    request
}

/// Instruction for judging a guess against the current clip.
///
/// Expected reply: [`JudgeReply`].
pub fn judge_instruction(track: &TrackKey) -> String {
    format!(
        "The clip to guess is {title} by {artist}. Judge whether the player's \
         answer is correct and whether it is complete. A complete answer \
         (artist and title) is worth 3 points, a partial answer 1 point, a \
         wrong answer 0 points. Answer with a single concise JSON object in \
         exactly this format:\n\
         {{\n\
           \"text\": \"What the presenter should say.\",\n\
           \"pointsEarned\": number_of_points_earned,\n\
           \"guessedItems\": {{\n\
             \"artist\": true_if_the_artist_was_found,\n\
             \"title\": true_if_the_title_was_found\n\
           }}\n\
         }}",
        title = track.title,
        artist = track.artist,
    )
}

/// Judging instruction for the supplementary guess of a partially-solved
/// round: the already-confirmed half is given as context, and the oracle is
/// told to reveal the answer if the round still is not fully solved.
pub fn completion_instruction(track: &TrackKey, already_guessed: GuessedItems) -> String {
    let mut instruction = judge_instruction(track);
    if already_guessed.artist {
        instruction.push_str(&format!(
            "\nThe player already found the artist ({}); this answer only \
             needs to provide the title.",
            track.artist
        ));
    }
    if already_guessed.title {
        instruction.push_str(&format!(
            "\nThe player already found the title ({}); this answer only \
             needs to provide the artist.",
            track.title
        ));
    }
    instruction.push_str(
        "\nThis is the player's final attempt for this clip: if the answer \
         is still not fully correct, reveal the correct artist and title in \
         your reply.",
    );
    instruction
}

// ════════════════════════════════════════════════════════════════════════
// Reply schemas
// ════════════════════════════════════════════════════════════════════════

/// Oracle reply to the theme-extraction prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeReply {
    pub text: String,
    #[serde(default)]
    pub theme: String,
}

/// Oracle reply to a clip-proposal prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipReply {
    pub text: String,
    #[serde(default)]
    pub extract: Option<ClipExtract>,
}

/// Proposed clip fields; either may be missing in a malformed reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipExtract {
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ClipReply {
    /// The proposed track, if both fields are present and non-empty.
    pub fn track(&self) -> Option<TrackKey> {
        let extract = self.extract.as_ref()?;
        let artist = extract.artist.as_deref()?.trim();
        let title = extract.title.as_deref()?.trim();
        if artist.is_empty() || title.is_empty() {
            return None;
        }
        Some(TrackKey::new(artist, title))
    }
}

/// Oracle reply to a judgment prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct JudgeReply {
    pub text: String,
    /// Signed on the wire; clamped to non-negative before scoring.
    #[serde(rename = "pointsEarned", default)]
    pub points_earned: i64,
    #[serde(rename = "guessedItems", default)]
    pub guessed_items: GuessedItems,
}

impl JudgeReply {
    /// Points awarded by this judgment, never negative.
    pub fn awarded_points(&self) -> u32 {
        self.points_earned.max(0) as u32
    }
}
