use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Returned when a string is not a member of a closed tag vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag {
    pub vocabulary: &'static str,
    pub tag: String,
}

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid {} tag", self.tag, self.vocabulary)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownTag {}

macro_rules! define_tagset {
    (
        $(#[$meta:meta])*
        $name:ident, $vocabulary:expr, {
            $( $variant:ident => ($tag:literal, $description:literal), )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
        pub enum $name {
            $(
                #[doc = $description]
                #[cfg_attr(feature = "serde", serde(rename = $tag))]
                $variant,
            )+
        }

        impl $name {
            /// Every member of the vocabulary, in canonical order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// The tag as written in a CoNLL-U column.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }

            /// Human readable gloss shown next to the tag.
            pub const fn description(self) -> &'static str {
                match self {
                    $($name::$variant => $description,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    _ => Err(UnknownTag {
                        vocabulary: $vocabulary,
                        tag: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

define_tagset!(
    /// Universal part-of-speech tags.
    Upos, "UPOS", {
        Adj => ("ADJ", "adjective"),
        Adp => ("ADP", "adposition"),
        Adv => ("ADV", "adverb"),
        Aux => ("AUX", "auxiliary"),
        Cconj => ("CCONJ", "coordinating conjunction"),
        Det => ("DET", "determiner"),
        Intj => ("INTJ", "interjection"),
        Noun => ("NOUN", "noun"),
        Num => ("NUM", "numeral"),
        Part => ("PART", "particle"),
        Pron => ("PRON", "pronoun"),
        Propn => ("PROPN", "proper noun"),
        Punct => ("PUNCT", "punctuation"),
        Sconj => ("SCONJ", "subordinating conjunction"),
        Sym => ("SYM", "symbol"),
        Verb => ("VERB", "verb"),
        X => ("X", "other; give the language specific tag in XPOS"),
    }
);

define_tagset!(
    /// Universal dependency relations, including the common subtypes.
    Deprel, "DEPREL", {
        Acl => ("acl", "clausal modifier of noun (adnominal clause)"),
        AclRelcl => ("acl:relcl", "relative clause modifier"),
        Advcl => ("advcl", "adverbial clause modifier"),
        AdvclRelcl => ("advcl:relcl", "adverbial relative clause modifier"),
        Advmod => ("advmod", "adverbial modifier"),
        AdvmodEmph => ("advmod:emph", "emphasizing word, intensifier"),
        AdvmodLmod => ("advmod:lmod", "locative adverbial modifier"),
        Amod => ("amod", "adjectival modifier"),
        Appos => ("appos", "appositional modifier"),
        Aux => ("aux", "auxiliary"),
        AuxPass => ("aux:pass", "passive auxiliary"),
        Case => ("case", "case marking"),
        Cc => ("cc", "coordinating conjunction"),
        CcPreconj => ("cc:preconj", "preconjunct"),
        Ccomp => ("ccomp", "clausal complement"),
        Clf => ("clf", "classifier"),
        Compound => ("compound", "compound"),
        CompoundLvc => ("compound:lvc", "light verb construction"),
        CompoundPrt => ("compound:prt", "phrasal verb particle"),
        CompoundRedup => ("compound:redup", "reduplicated compounds"),
        CompoundSvc => ("compound:svc", "serial verb compounds"),
        Conj => ("conj", "conjunct"),
        Cop => ("cop", "copula"),
        Csubj => ("csubj", "clausal subject"),
        CsubjOuter => ("csubj:outer", "outer clause clausal subject"),
        CsubjPass => ("csubj:pass", "clausal passive subject"),
        Dep => ("dep", "unspecified dependency"),
        Det => ("det", "determiner"),
        DetNomgov => ("det:nomgov", "pronominal quantifier governing the case of the noun"),
        DetNummod => ("det:nummod", "pronominal quantifier agreeing in case with the noun"),
        DetPoss => ("det:poss", "possessive determiner"),
        Discourse => ("discourse", "discourse element"),
        Dislocated => ("dislocated", "dislocated element"),
        Expl => ("expl", "expletive"),
        ExplImpers => ("expl:impers", "impersonal expletive"),
        ExplPass => ("expl:pass", "reflexive pronoun used in reflexive passive"),
        ExplPv => ("expl:pv", "reflexive clitic with an inherently reflexive verb"),
        Foc => ("foc", "focus marker"),
        Fixed => ("fixed", "fixed multiword expression"),
        Flat => ("flat", "flat expression"),
        FlatForeign => ("flat:foreign", "foreign words"),
        FlatName => ("flat:name", "names"),
        Goeswith => ("goeswith", "goes with"),
        Iobj => ("iobj", "indirect object"),
        List => ("list", "list"),
        Mark => ("mark", "marker"),
        Nmod => ("nmod", "nominal modifier"),
        NmodPoss => ("nmod:poss", "possessive nominal modifier"),
        NmodTmod => ("nmod:tmod", "temporal modifier"),
        Nsubj => ("nsubj", "nominal subject"),
        NsubjOuter => ("nsubj:outer", "outer clause nominal subject"),
        NsubjPass => ("nsubj:pass", "passive nominal subject"),
        Nummod => ("nummod", "numeric modifier"),
        NummodGov => ("nummod:gov", "numeric modifier governing the case of the noun"),
        Obj => ("obj", "object"),
        Obl => ("obl", "oblique nominal"),
        OblAgent => ("obl:agent", "oblique agent in passive construction"),
        OblArg => ("obl:arg", "oblique argument"),
        OblLmod => ("obl:lmod", "locative modifier"),
        OblTmod => ("obl:tmod", "temporal modifier"),
        Orphan => ("orphan", "orphan"),
        Parataxis => ("parataxis", "parataxis"),
        Punct => ("punct", "punctuation"),
        Reparandum => ("reparandum", "overridden disfluency"),
        Root => ("root", "root"),
        Vocative => ("vocative", "vocative"),
        Xcomp => ("xcomp", "open clausal complement"),
    }
);

impl Deprel {
    pub fn is_root(self) -> bool {
        self == Deprel::Root
    }
}
