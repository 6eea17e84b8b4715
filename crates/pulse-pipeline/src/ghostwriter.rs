//! Structured LinkedIn post generation with a length-bounded retry.

use std::sync::Arc;

use pulse_core::PostStructure;

use crate::capabilities::{GenerationError, PostGenerator};

pub const SYSTEM_PROMPT: &str = "\
Sei Ghostwriter, assistente editoriale professionale specializzato in LinkedIn.
Scrivi sempre e solo in ITALIANO.

STRUTTURA OBBLIGATORIA:
- Rispondi con un JSON valido con le chiavi hook, insight_body, human_connection, open_loop.
- hook: al massimo 2 frasi, tono assertivo, nessun saluto formale. Non iniziare con formule come \"In questo post...\" o \"Oggi parliamo di...\".
- insight_body: da 3 a 6 frasi che rielaborano e collegano i punti chiave degli insight, senza copiare i bullet.
- human_connection: 1 o 2 frasi personali o di esperienza legate al contesto professionale dell'utente.
- open_loop: una domanda aperta che inviti alla discussione, senza call to action commerciali (\"contattami\", \"prenota una call\", \"link in bio\").

TONO:
- Assertivo, professionale, chiaro, mai accademico.
- Niente \"Gentili colleghi\" o saluti formali in apertura o chiusura.
- Niente slang estraneo al contesto business.
- Al massimo 2 emoji pertinenti, solo se utili.

SICUREZZA:
- Evita contenuti discriminatori, d'odio o politicamente esplosivi al di fuori di un contesto informativo neutro.";

pub const MAX_TOTAL_CHARS: usize = 1600;
pub const MIN_TOTAL_CHARS: usize = 600;
pub const MAX_ATTEMPTS: u32 = 2;

pub const CONCISE_HINT: &str = "\nFai la risposta più concisa mantenendo i punti chiave.";
pub const EXPAND_HINT: &str = "\nEspandi leggermente l'analisi verso 700-1400 caratteri.";

/// The user message for one generation attempt.
#[must_use]
pub fn user_prompt(insight_texts: &[String], user_context: &str) -> String {
    format!(
        "Crea un post LinkedIn in italiano seguendo la struttura obbligatoria.\n\
         Contesto utente: {user_context}\n\
         Insight da usare:\n- {}",
        insight_texts.join("\n- ")
    )
}

/// Correction appended to the user context when `total_chars` is outside
/// the accepted window. Over-length is checked first.
#[must_use]
pub fn length_hint(total_chars: usize) -> Option<&'static str> {
    if total_chars > MAX_TOTAL_CHARS {
        Some(CONCISE_HINT)
    } else if total_chars < MIN_TOTAL_CHARS {
        Some(EXPAND_HINT)
    } else {
        None
    }
}

pub struct Ghostwriter {
    generator: Arc<dyn PostGenerator>,
}

impl Ghostwriter {
    #[must_use]
    pub fn new(generator: Arc<dyn PostGenerator>) -> Self {
        Self { generator }
    }

    /// Generates a post, retrying once with a length correction when the
    /// first result falls outside 600..=1600 characters. The second result
    /// is returned as-is.
    ///
    /// # Errors
    ///
    /// Propagates [`GenerationError`] from the generator without retrying.
    pub async fn generate(
        &self,
        insight_texts: &[String],
        user_context: &str,
    ) -> Result<PostStructure, GenerationError> {
        let mut context = user_context.to_string();
        let mut attempt = 1;
        loop {
            let post = self
                .generator
                .complete_post(SYSTEM_PROMPT, &user_prompt(insight_texts, &context))
                .await?;
            let total = post.total_chars();
            tracing::info!(attempt, total_chars = total, "ghostwriter attempt");

            match length_hint(total) {
                Some(hint) if attempt < MAX_ATTEMPTS => {
                    context.push_str(hint);
                    attempt += 1;
                }
                _ => return Ok(post),
            }
        }
    }
}
