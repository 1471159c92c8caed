//! Shared test data.

use chrono::NaiveDate;
use informativos_core::{Judgment, Repercussion, split_branches};

use crate::table::InformativoTable;

pub(crate) fn judgment(id: &str, date: &str, branches: &str) -> Judgment {
    Judgment {
        id: id.to_string(),
        title: format!("Julgado {id}"),
        thesis: format!("Tese do julgado {id}."),
        summary: String::new(),
        legislation: String::new(),
        process_class: "RE".to_string(),
        bulletin: String::new(),
        repercussion: Repercussion::NotInformed,
        judgment_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        branches: split_branches(branches),
    }
}

/// Five judgments, six exploded rows: `0` has two branches, `4` has none.
pub(crate) fn sample_judgments() -> Vec<Judgment> {
    let mut j0 = judgment("0", "2021-03-15", "Direito Civil;Direito Penal");
    j0.title = "Usucapião de imóvel rural".into();
    j0.thesis = "A usucapião especial rural exige posse ininterrupta.".into();
    j0.summary = "Posse qualificada (art. 191 CF).".into();
    j0.repercussion = Repercussion::Yes;
    j0.bulletin = "1001".into();

    let mut j1 = judgment("1", "2022-06-01", "Direito Constitucional");
    j1.title = "Lei estadual sobre saúde".into();
    j1.thesis = "Competência concorrente dos estados em saúde pública.".into();
    j1.process_class = "ADI".into();
    j1.repercussion = Repercussion::No;
    j1.bulletin = "1050".into();

    let mut j2 = judgment("2", "2023-09-20", "Direito Tributário");
    j2.title = "ICMS na base de cálculo".into();
    j2.thesis = "O ICMS não compõe a base de cálculo do PIS.".into();
    j2.summary = "Tema 69.".into();
    j2.bulletin = "999".into();

    let mut j3 = judgment("3", "2024-11-05", "Direito Penal");
    j3.title = "Prisão preventiva".into();
    j3.thesis = "Revisão periódica da prisão preventiva a cada 90 dias.".into();
    j3.process_class = "HC".into();
    j3.repercussion = Repercussion::Yes;
    j3.bulletin = "1050".into();

    let mut j4 = judgment("4", "2024-01-10", "");
    j4.title = "Descumprimento de preceito fundamental".into();
    j4.thesis = "Arguição sobre política ambiental.".into();
    j4.process_class = "ADPF".into();
    j4.repercussion = Repercussion::No;

    vec![j0, j1, j2, j3, j4]
}

pub(crate) fn sample_table() -> InformativoTable {
    InformativoTable::from_judgments(&sample_judgments()).unwrap()
}
