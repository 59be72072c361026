//! # Modernization Engine
//!
//! ## Purpose
//! Rewrites archaic English diction ("thee", "hath", "spake") into modern
//! equivalents using a fixed, ordered table of literal substring
//! substitutions. This pass is independent of the rule engine: it operates
//! directly on the hierarchical corpus and never drops structure.
//!
//! ## Input/Output Specification
//! - **Input**: verse text or a whole [`Corpus`]
//! - **Output**: rewritten text; for corpora, the modified-verse count
//! - **Ordering**: the table is a literal ordered list, not a map — bare-word
//!   and punctuation-boundary variants of the same archaic word overlap by
//!   design and must apply in a fixed order
//!
//! The table is crafted so its outputs never re-match its inputs
//! (space-delimited archaic tokens map to modern words that are not
//! themselves keys), which makes repeated application idempotent.

use crate::corpus::Corpus;
use tracing::info;

/// The canonical archaic → modern substitution table, in application order:
/// lowercase space-delimited forms, then capitalized-initial forms, then
/// punctuation-boundary and prefix forms.
pub static MODERNIZATION_TABLE: &[(&str, &str)] = &[
    // Lowercase space-delimited forms
    (" thee ", " you "),
    (" thou ", " you "),
    (" thy ", " your "),
    (" thine ", " your "),
    (" ye ", " you "),
    (" art ", " are "),
    (" hast ", " have "),
    (" hadst ", " had "),
    (" doest ", " do "),
    (" didst ", " did "),
    (" wilt ", " will "),
    (" shalt ", " shall "),
    (" shouldst ", " should "),
    (" wouldst ", " would "),
    (" mayest ", " may "),
    (" mightest ", " might "),
    (" canst ", " can "),
    (" couldst ", " could "),
    (" knowest ", " know "),
    (" sayest ", " say "),
    (" saith ", " says "),
    (" doth ", " does "),
    (" hath ", " has "),
    (" spake ", " spoke "),
    (" shew ", " show "),
    (" shewed ", " showed "),
    (" betwixt ", " between "),
    (" whence ", " from where "),
    (" whither ", " to where "),
    (" wherefore ", " why "),
    (" hither ", " here "),
    (" thither ", " there "),
    (" forsooth ", " indeed "),
    (" peradventure ", " perhaps "),
    (" verily ", " truly "),
    (" lest ", " in case "),
    (" yea ", " yes "),
    (" nay ", " no "),
    (" anon ", " soon "),
    (" aught ", " anything "),
    (" nought ", " nothing "),
    (" behold ", " look "),
    (" lo ", " look "),
    (" woe ", " sorrow "),
    (" marvel ", " be amazed "),
    (" charity ", " love "),
    (" concupiscence ", " lust "),
    (" fornication ", " sexual immorality "),
    (" unto ", " to "),
    // Capitalized-initial forms (sentence starts after spaces)
    (" Thee ", " You "),
    (" Thou ", " You "),
    (" Thy ", " Your "),
    (" Thine ", " Your "),
    (" Ye ", " You "),
    (" Art ", " Are "),
    (" Hast ", " Have "),
    (" Hadst ", " Had "),
    (" Doest ", " Do "),
    (" Didst ", " Did "),
    (" Wilt ", " Will "),
    (" Shalt ", " Shall "),
    (" Shouldst ", " Should "),
    (" Wouldst ", " Would "),
    (" Mayest ", " May "),
    (" Mightest ", " Might "),
    (" Canst ", " Can "),
    (" Couldst ", " Could "),
    (" Knowest ", " Know "),
    (" Sayest ", " Say "),
    (" Saith ", " Says "),
    (" Doth ", " Does "),
    (" Hath ", " Has "),
    (" Spake ", " Spoke "),
    (" Shew ", " Show "),
    (" Shewed ", " Showed "),
    (" Betwixt ", " Between "),
    (" Whence ", " From where "),
    (" Whither ", " To where "),
    (" Wherefore ", " Why "),
    (" Hither ", " Here "),
    (" Thither ", " There "),
    (" Forsooth ", " Indeed "),
    (" Peradventure ", " Perhaps "),
    (" Verily ", " Truly "),
    (" Lest ", " In case "),
    (" Yea ", " Yes "),
    (" Nay ", " No "),
    (" Anon ", " Soon "),
    (" Aught ", " Anything "),
    (" Nought ", " Nothing "),
    (" Behold ", " Look "),
    (" Lo ", " Look "),
    (" Woe ", " Sorrow "),
    (" Marvel ", " Be amazed "),
    (" Charity ", " Love "),
    (" Concupiscence ", " Lust "),
    (" Fornication ", " Sexual immorality "),
    (" Unto ", " To "),
    // Brace-annotated and punctuation-boundary forms
    ("{art}", "{are}"),
    ("{Art}", "{Are}"),
    ("thee,", "you,"),
    ("thee.", "you."),
    ("thee:", "you:"),
    ("thee;", "you;"),
    ("thee?", "you?"),
    ("thee!", "you!"),
    ("thou,", "you,"),
    ("thou.", "you."),
    ("thou:", "you:"),
    ("thou;", "you;"),
    ("thou?", "you?"),
    ("thou!", "you!"),
    ("thy ", "your "),
    ("thine ", "your "),
    (",thee ", ",you "),
    (",thou ", ",you "),
];

/// Apply the full modernization table to one text, in table order. Every
/// entry is applied unconditionally regardless of whether earlier entries
/// matched.
pub fn modernize_text(text: &str) -> String {
    let mut out = text.to_string();
    for (old, new) in MODERNIZATION_TABLE {
        if out.contains(old) {
            out = out.replace(old, new);
        }
    }
    out
}

/// Modernize every verse in the corpus. Returns the new corpus and the
/// number of verses whose text changed. Structure — including empty chapter
/// and verse entries — is always preserved.
pub fn modernize_corpus(corpus: &Corpus) -> (Corpus, usize) {
    let (modernized, modified) = corpus.map_verse_texts(|_, _, _, text| modernize_text(text));
    info!("Modernized {} verses", modified);
    (modernized, modified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_substitutions() {
        assert_eq!(
            modernize_text("and he said, Whither goest thou? and thou saidst"),
            "and he said, To where goest you? and you saidst"
        );
        assert_eq!(
            modernize_text("for thou art with me; thy rod and thy staff"),
            "for you are with me; your rod and your staff"
        );
    }

    #[test]
    fn test_punctuation_boundary_forms() {
        assert_eq!(modernize_text("I say to thee, arise"), "I say to you, arise");
        assert_eq!(modernize_text("peace be to thee."), "peace be to you.");
    }

    #[test]
    fn test_capitalized_forms() {
        assert_eq!(
            modernize_text("said, Behold the man; and Verily I say"),
            "said, Look the man; and Truly I say"
        );
    }

    #[test]
    fn test_modernization_is_idempotent_on_modern_text() {
        let archaic = " thou hast heard that it hath been said to thee, and thy ways ";
        let once = modernize_text(archaic);
        let twice = modernize_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_modernize_corpus_counts_and_preserves_structure() {
        let mut corpus = Corpus::new();
        corpus.insert_verse("Enoch", 1, 1, "Behold, he cometh with ten thousands");
        corpus.insert_verse("Enoch", 1, 2, "already modern text");
        corpus.ensure_chapter("Enoch", 2);

        let (modernized, modified) = modernize_corpus(&corpus);
        assert_eq!(modified, 0); // "Behold" at line start has no leading space
        assert_eq!(modernized.chapter_count(), 2);
        assert!(modernized.book("Enoch").unwrap().get(&2).unwrap().is_empty());

        let mut corpus = Corpus::new();
        corpus.insert_verse("Enoch", 1, 1, "And behold he cometh to judge");
        let (modernized, modified) = modernize_corpus(&corpus);
        assert_eq!(modified, 1);
        assert_eq!(
            modernized.verse("Enoch", 1, 1),
            Some("And look he cometh to judge")
        );
    }

    #[test]
    fn test_table_outputs_never_rematch_inputs() {
        for (_, new) in MODERNIZATION_TABLE {
            for (old, _) in MODERNIZATION_TABLE {
                assert!(
                    !new.contains(*old) || new == old,
                    "table output '{}' re-matches input '{}'",
                    new,
                    old
                );
            }
        }
    }
}
