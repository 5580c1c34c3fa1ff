mod common;

use common::StubLoader;
use radigenius::config::presets::{FINETUNING_CONFIG, INFERENCE_CONFIG};
use radigenius::model::{initialize_model, ComputeDevice, ErrorKind};
use radigenius::predict::Predictor;

#[tokio::test]
async fn test_finetuning_preset_is_forwarded() {
    let loader = StubLoader::default();
    initialize_model(&loader, Some("FineTuning"), ComputeDevice::Cpu).await.unwrap();

    let loaded = loader.loaded.lock().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].0, &FINETUNING_CONFIG);
    assert_eq!(loaded[0].1, ComputeDevice::Cpu);
}

#[tokio::test]
async fn test_unknown_or_missing_mode_loads_inference_preset() {
    let loader = StubLoader::default();
    initialize_model(&loader, Some("training"), ComputeDevice::Cpu).await.unwrap();
    initialize_model(&loader, None, ComputeDevice::Cpu).await.unwrap();

    let loaded = loader.loaded.lock().unwrap();
    assert!(loaded.iter().all(|(config, _)| *config == &INFERENCE_CONFIG));
}

#[tokio::test]
async fn test_load_failure_propagates() {
    let loader = StubLoader { fail_with: Some("weights not found".to_string()), ..Default::default() };

    let err = initialize_model(&loader, Some("inference"), ComputeDevice::Cpu)
        .await
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Load);
    assert_eq!(err.to_string(), "weights not found");
}

#[tokio::test]
async fn test_loaded_pair_drives_prediction() {
    let loader = StubLoader::default();
    let (model, tokenizer) = initialize_model(&loader, None, ComputeDevice::Cpu).await.unwrap();
    let predictor = Predictor::new(model, tokenizer, ComputeDevice::Cpu);

    let output = predictor.describe(&common::test_image(), "describe").await;
    assert_eq!(output, "assistant: ok");
}
