//! Built-in drill vocabulary and sampling.

use std::collections::HashSet;

use rand::seq::SliceRandom;

/// Words the dictionary-backed source draws from.
pub const VOCABULARY: &[&str] = &[
    "abate", "aberration", "abhor", "abridge", "abscond", "absolutism", "abstruse",
    "accost", "acquaintance", "acquiesce", "adulation", "affable", "affinity",
    "affliction", "affluent", "aggrandize", "alleviate", "altruism", "altruistic",
    "amalgamation", "ambiguity", "ambiguous", "ambivalent", "amiable",
    "anachronism", "anathema", "anomalous", "anomaly", "antagonistic", "antipathy",
    "apathetic", "apathy", "aptitude", "arbitrary", "ascertain", "ascetic",
    "astute", "atrocious", "audacity", "austerity", "balk", "belligerence",
    "belligerent", "beneficence", "beneficiary", "benevolence", "benevolent",
    "benign", "biography", "blandish", "bravado", "brevity", "brusque", "cajole",
    "calamity", "calibrate", "candid", "capitalism", "capricious", "cauterize",
    "censure", "chronic", "civility", "clandestine", "clerical", "coalesce",
    "coerce", "coercive", "cogent", "cognitive", "coherent", "commensurate",
    "compel", "compelling", "complacent", "compliant", "complicit", "compunctious",
    "concur", "condone", "conflagration", "congenial", "congregate",
    "conscientious", "consonant", "contentious", "contrite", "conundrum",
    "conviction", "convoluted", "copious", "corrigible", "corroborate",
    "counterfeit", "credulous", "cryptic", "culminate", "culpable", "cursory",
    "cynical", "decadent", "defenestrate", "deference", "deliberate", "delineate",
    "demeanor", "denial", "denounce", "depravity", "depreciate", "deride",
    "detestable", "detrimental", "devious", "diatribe", "diffident", "diffuse",
    "diligence", "diligent", "disband", "disconcerting", "discord", "discrepancy",
    "discretion", "discretionary", "disgorge", "disgruntled", "dispel",
    "disseminate", "dissent", "dissident", "dissipate", "dissolve", "divine",
    "divulge", "dormant", "dubious", "duress", "effervescent", "efficacious",
    "egregious", "eloquent", "elucidate", "elusive", "emaciated", "embellish",
    "emollient", "empathic", "empathy", "emulate", "enervate", "enervated",
    "engage", "engender", "enigma", "entail", "ephemeral", "epiphany", "equanimity",
    "equivocal", "erudite", "ethereal", "exacerbate", "exceed", "exceptional",
    "exclusive", "exemplary", "exhume", "exonerate", "exorbitant", "extant",
    "extemporaneous", "facade", "facile", "facilitate", "faithful", "fallacious",
    "fallacy", "fathom", "feasible", "fervent", "fickle", "flabbergasted",
    "flagrant", "foreshadow", "fortuitous", "frantic", "frivolous", "garrulous",
    "generic", "genteel", "genuine", "gratuitous", "gregarious", "grievance",
    "harangue", "harbinger", "haughty", "hazardous", "hegemonic", "hegemony",
    "histrionics", "hubris", "hypocrisy", "idiosyncratic", "ignominious",
    "illiterate", "imminent", "immutable", "impartial", "impeccable", "imperative",
    "imperturbable", "impetuous", "inaugural", "incessant", "inclement",
    "incoherent", "incongruous", "incorrigible", "incumbent", "indefatigable",
    "indignant", "ineffable", "inept", "inevitable", "inexorable", "infer",
    "inflexible", "innate", "innocuous", "inquisitive", "insidious", "insipid",
    "insolent", "instigate", "insurgent", "interloper", "intervene", "intransigent",
    "intrepid", "intricate", "intuitive", "invasive", "invective", "irrelevant",
    "isolated", "jargon", "jeopardize", "judicious", "juvenile", "juxtapose",
    "keen", "laconic", "lament", "latent", "laudable", "laxity", "legitimate",
    "lethargic", "lethargy", "leverage", "loquacious", "loyal", "lucid", "luminous",
    "magnanimous", "malcontent", "malevolent", "malicious", "malleability",
    "malleable", "manifest", "manipulate", "meager", "meander", "mellifluous",
    "mendacious", "mendicant", "mercenary", "meritorious", "methodical",
    "meticulous", "mitigate", "monotony", "morose", "mundane", "narrative",
    "nefarious", "nocturnal", "nominal", "nonchalant", "nonplussed", "notorious",
    "noxious", "nuance", "nuanced", "obdurate", "obfuscate", "oblivion",
    "oblivious", "occlude", "omnipotent", "opaque", "opportune", "oppressive",
    "optimistic", "ostensible", "ostentatious", "overwrought", "paradox", "paragon",
    "pathetic", "patriarchal", "patriotic", "pedagogue", "pedantic", "perfidious",
    "pernicious", "perpetuate", "perplexed", "perturbation", "pervasive",
    "philanthropy", "plausible", "plentiful", "plethora", "polemical", "populist",
    "pragmatic", "precarious", "precipitate", "precipitous", "predilection",
    "prevalent", "pristine", "prodigal", "prodigious", "profound", "profuse",
    "prolific", "propagate", "propensity", "propitious", "prosaic", "proscribe",
    "quaint", "quandary", "quick-witted", "quintessential", "quixotic", "rampant",
    "ravenous", "recalcitrant", "recant", "reciprocal", "recluse", "recondite",
    "redolent", "redundant", "refute", "regale", "relevant", "reluctant",
    "remunerate", "renowned", "rescind", "resilient", "resistant", "resolute",
    "reverence", "revile", "rhetoric", "rigorous", "robust", "safeguard",
    "sagacious", "salient", "sanguine", "sarcastic", "self-evident", "sentient",
    "serendipitous", "serendipity", "serene", "serenity", "solace", "solicitous",
    "speculative", "spontaneous", "spurious", "stagnant", "staunch", "stint",
    "stoic", "strenuous", "subdued", "subjective", "subjugate", "subjugation",
    "subterfuge", "subtle", "subversive", "succinct", "succumb", "supercilious",
    "superficial", "sustenance", "sycophant", "synergy", "taciturn", "tantamount",
    "tedious", "temporal", "tenable", "tenacious", "tenuous", "terrestrial",
    "toxic", "trivial", "turbulent", "ubiquitous", "uncanny", "unfathomable",
    "unprecedented", "unravel", "unveiled", "urbane", "vacillate", "vehement",
    "venerable", "venerate", "veracity", "vicarious", "vigilant", "vindicate",
    "virtue", "vivacious", "vivid", "vociferous", "volatile", "volition",
    "warranted", "wary", "whimsical", "zeal", "zealot", "zealous", "zenith", "zest",
];

/// Pick up to `n` distinct words from `words`, in random order.
///
/// Duplicates in `words` (compared case-insensitively) are collapsed first,
/// so the result never repeats a word.
pub fn sample<S: AsRef<str>>(words: &[S], n: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = words
        .iter()
        .map(|w| w.as_ref().trim())
        .filter(|w| !w.is_empty() && seen.insert(w.to_lowercase()))
        .collect();
    let mut rng = rand::thread_rng();
    unique
        .choose_multiple(&mut rng, n)
        .map(|w| w.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_list_has_no_duplicates() {
        let unique: HashSet<&str> = VOCABULARY.iter().copied().collect();
        assert_eq!(unique.len(), VOCABULARY.len());
    }

    #[test]
    fn built_in_list_is_sorted_and_complete() {
        assert!(VOCABULARY.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(VOCABULARY.len(), 450);
        for word in ["amalgamation", "quick-witted", "self-evident", "serendipitous"] {
            assert!(VOCABULARY.contains(&word), "{word} missing");
        }
    }

    #[test]
    fn sample_is_distinct_and_capped() {
        let words = ["zest", "Zest", "abate", "  ", "zenith"];
        let picked = sample(&words[..], 10);
        assert_eq!(picked.len(), 3);
        let lowered: HashSet<String> = picked.iter().map(|w| w.to_lowercase()).collect();
        assert_eq!(lowered.len(), 3);
    }

    #[test]
    fn sample_respects_n() {
        assert_eq!(sample(VOCABULARY, 5).len(), 5);
        assert!(sample(VOCABULARY, 0).is_empty());
    }
}
