//! Static list of the translations the reader knows about. There is no
//! discovery: a translation exists only if it is listed here.

use crate::models::Translation;

pub const TRANSLATIONS: &[Translation] = &[
    Translation {
        code: "ACF",
        name: "Almeida Corrigida Fiel",
        file_name: "ACF.sqlite",
    },
    Translation {
        code: "ARA",
        name: "Almeida Revista e Atualizada",
        file_name: "ARA.sqlite",
    },
    Translation {
        code: "ARC",
        name: "Almeida Revista e Corrigida",
        file_name: "ARC.sqlite",
    },
    Translation {
        code: "NVI",
        name: "Nova Versão Internacional",
        file_name: "NVI.sqlite",
    },
    Translation {
        code: "NTLH",
        name: "Nova Tradução na Linguagem de Hoje",
        file_name: "NTLH.sqlite",
    },
    Translation {
        code: "KJV",
        name: "King James Version",
        file_name: "KJV.sqlite",
    },
];

/// Translation opened on first launch.
pub fn default_translation() -> Translation {
    TRANSLATIONS[0]
}

pub fn find_by_code(code: &str) -> Option<Translation> {
    TRANSLATIONS
        .iter()
        .find(|t| t.code.eq_ignore_ascii_case(code))
        .copied()
}

pub fn find_by_file_name(file_name: &str) -> Option<Translation> {
    TRANSLATIONS
        .iter()
        .find(|t| t.file_name == file_name)
        .copied()
}
