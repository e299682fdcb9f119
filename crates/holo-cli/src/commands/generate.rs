//! Pack generation command

use super::{load_form, open_localizer};
use anyhow::{Context, Result};
use holo_core::{HoloError, InputFile, ValidationError};
use holo_i18n::Localizer;
use holo_intake::{Channel, ChannelOutcome, DropOutcome, Intake, UnsupportedWorldExtractor};
use holo_pack::engines::create_engine;
use holo_pack::{
    BuiltinStackResolver, Dispatcher, GenerationOutcome, HoloSettings, LogBuffer,
    MockPackExtractor,
};
use std::collections::BTreeMap;
use std::path::Path;

pub struct GenerateArgs {
    pub files: Vec<String>,
    pub form: Option<String>,
    pub resource_packs: Vec<String>,
    pub output: String,
    pub engine: String,
}

pub fn run(args: GenerateArgs, lang: Option<&str>, settings: &HoloSettings, logs: LogBuffer) -> Result<()> {
    pollster::block_on(generate(args, lang, settings, logs))
}

async fn generate(
    args: GenerateArgs,
    lang: Option<&str>,
    settings: &HoloSettings,
    logs: LogBuffer,
) -> Result<()> {
    let localizer = open_localizer(settings, lang).await;
    let intake = Intake::new(
        localizer.clone(),
        Box::new(UnsupportedWorldExtractor),
        Box::new(MockPackExtractor::new()),
    );

    let inputs = read_inputs(&args.files)?;
    match intake.route_files(inputs).await {
        DropOutcome::Selected(report) => {
            if let Some(message) = intake.direct_error_message() {
                eprintln!("{} ({})", message, report.rejected.join(", "));
            }
        }
        DropOutcome::World(outcome) => print_channel(&intake, Channel::World, &outcome),
        DropOutcome::PriorOutput(outcome) => print_channel(&intake, Channel::PriorOutput, &outcome),
        DropOutcome::Replaced(_) => {}
        DropOutcome::Ignored => {
            anyhow::bail!("None of the given files is a structure, pack or world");
        }
    }

    let form = load_form(args.form.as_deref())?;
    let local_packs = read_inputs(&args.resource_packs)?;

    let dispatcher = Dispatcher::new(
        create_engine(&args.engine)?,
        Box::new(BuiltinStackResolver::new()),
        logs,
    )
    .with_report_settings(settings.report.clone());

    let files = intake.files();
    let mut placeholder = BTreeMap::new();
    placeholder.insert("count".to_string(), files.len().to_string());
    println!("{}", localizer.render_current("progress.generating", &placeholder));

    let outcome = match dispatcher
        .submit(&form, &files, intake.direct_error(), &local_packs)
        .await
    {
        Ok(outcome) => outcome,
        Err(HoloError::Validation(e)) => anyhow::bail!("{}", validation_message(&localizer, &e)),
        Err(e) => return Err(e.into()),
    };

    report_outcome(&localizer, &outcome, Path::new(&args.output))
}

fn validation_message(localizer: &Localizer, err: &ValidationError) -> String {
    let mut subs = BTreeMap::new();
    if let ValidationError::WrongFileType { accepted } = err {
        subs.insert("file_type".to_string(), accepted.clone());
    }
    localizer.render_current(err.translation_key(), &subs)
}

fn read_inputs(paths: &[String]) -> Result<Vec<InputFile>> {
    paths
        .iter()
        .map(|p| InputFile::read(p).with_context(|| format!("Failed to read '{}'", p)))
        .collect()
}

fn print_channel(intake: &Intake, channel: Channel, outcome: &ChannelOutcome) {
    if let ChannelOutcome::Applied(state) = outcome {
        if let Some(message) = intake.channel_message(channel) {
            if state.is_error() {
                eprintln!("{}", message);
            } else {
                println!("{}", message);
            }
        }
    }
}

fn report_outcome(localizer: &Localizer, outcome: &GenerationOutcome, output: &Path) -> Result<()> {
    let label = localizer.translate_current(outcome.translation_key());
    match outcome {
        GenerationOutcome::Success(artifact) => {
            let path = artifact
                .write_to(output)
                .with_context(|| format!("Failed to write pack to '{}'", output.display()))?;
            println!("{}: {}", label, path.display());
            println!("  Size: {} bytes", artifact.bytes.len());
            println!("  Hash: {}", artifact.hash.to_prefixed_hex());
            Ok(())
        }
        GenerationOutcome::UserFacingFailure { message } => {
            anyhow::bail!("{}: {}", label, message)
        }
        GenerationOutcome::CrashFailure { message, report, .. } => {
            eprintln!("{}", label);
            eprintln!("  {}", report.url);
            anyhow::bail!("{}", message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holo_i18n::{Document, MemoryCatalogLoader};
    use std::rc::Rc;

    fn localizer() -> Rc<Localizer> {
        let loader = MemoryCatalogLoader::new().with_catalog(
            "en_US",
            "English",
            [
                ("upload.error.wrong_file_type", "Please upload only {FILE_TYPE} files."),
                ("list.or", "or"),
            ]
            .into_iter()
            .collect(),
        );
        let localizer = Rc::new(Localizer::new(Box::new(loader), "v1"));
        pollster::block_on(localizer.set_language("en_US", &mut Document::new()));
        localizer
    }

    #[test]
    fn test_wrong_type_pick_blocks_generation() {
        let localizer = localizer();
        let intake = Intake::new(
            localizer.clone(),
            Box::new(UnsupportedWorldExtractor),
            Box::new(MockPackExtractor::new()),
        );
        intake.select_files(vec![
            InputFile::new("a.mcstructure", vec![1]),
            InputFile::new("b.png", vec![2]),
        ]);
        let dispatcher = Dispatcher::new(
            create_engine("mock").unwrap(),
            Box::new(BuiltinStackResolver::new()),
            LogBuffer::new(),
        );

        let err = pollster::block_on(dispatcher.submit(
            &holo_pack::FormSnapshot::new(),
            &intake.files(),
            intake.direct_error(),
            &[],
        ))
        .unwrap_err();
        match err {
            HoloError::Validation(e) => assert_eq!(
                validation_message(&localizer, &e),
                "Please upload only .mcstructure files."
            ),
            other => panic!("expected a validation error, got {:?}", other),
        }
        assert!(dispatcher.control().is_enabled());
    }
}
