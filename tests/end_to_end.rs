use college_mail_analyzer::models::Config;
use college_mail_analyzer::{mailbox, report, Pipeline, ReferenceIndex};
use std::fs;

const REFERENCE: &str = "\
institution.displayName,searchData.acceptanceRate.rawValue
Boston University,14
Creighton University,72
University of Colorado Denver,68
";

#[test]
fn personal_sender_resolves_to_reference_rate() {
    let index = ReferenceIndex::from_reader(REFERENCE.as_bytes()).unwrap();
    let config = Config::default();
    let pipeline = Pipeline::from_config(&config, &index);

    assert_eq!(pipeline.resolve("Jane Doe <jane@bu.edu>").as_deref(), Some("14"));
    assert_eq!(pipeline.resolve("admissions@vchsweb.org"), None);
}

#[test]
fn scan_directory_and_average_by_day() {
    let dir = tempfile::tempdir().unwrap();
    let mail_dir = dir.path().join("mail");
    fs::create_dir(&mail_dir).unwrap();

    fs::write(
        mail_dir.join("001.eml"),
        "From: Jane Doe <jane@bu.edu>\r\nDate: Wed, 1 May 2024 08:00:00 -0400\r\n\r\nHi\r\n",
    )
    .unwrap();
    fs::write(
        mail_dir.join("002.eml"),
        "From: \"Univ. of Colorado Denver\" <news@ucdenver.edu>\r\n\
         Date: Wed, 1 May 2024 17:00:00 -0600\r\n\r\nHi\r\n",
    )
    .unwrap();
    fs::write(
        mail_dir.join("003.eml"),
        "From: Creighton Admissions <apply@creighton.edu>\r\n\
         Date: Thu, 2 May 2024 12:00:00 -0500\r\n\r\nHi\r\n",
    )
    .unwrap();
    fs::write(
        mail_dir.join("004.eml"),
        "From: College Board <noreply@collegeboard.org>\r\n\
         Date: Thu, 2 May 2024 12:00:00 -0500\r\n\r\nHi\r\n",
    )
    .unwrap();

    let index = ReferenceIndex::from_reader(REFERENCE.as_bytes()).unwrap();
    let config = Config::default();
    let pipeline = Pipeline::from_config(&config, &index);

    let messages = mailbox::read_mail_directory(&mail_dir).unwrap();
    let result = pipeline.run(&messages);
    assert_eq!(result.summary.total, 4);
    assert_eq!(result.summary.resolved, 3);
    assert_eq!(result.summary.excluded, 1);

    let names: Vec<&str> = result.records.iter().map(|r| r.college_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "BOSTON-UNIVERSITY",
            "UNIVERSITY-OF-COLORADO-DENVER",
            "CREIGHTON",
        ]
    );

    let output = dir.path().join("college_emails.csv");
    report::write_records(&result.records, &output).unwrap();
    let averages = report::daily_averages(&report::read_records(&output).unwrap());

    assert_eq!(averages.len(), 2);
    assert_eq!(averages[0].date, "2024-05-01");
    assert_eq!(averages[0].acceptance_rate, 41);
    assert_eq!(averages[1].date, "2024-05-02");
    assert_eq!(averages[1].acceptance_rate, 72);
}
