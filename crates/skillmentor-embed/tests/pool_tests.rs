use candle_core::{DType, Device, Tensor};
use skillmentor_embed::masked_mean_l2;

#[test]
fn padded_tokens_do_not_shift_the_mean() {
    let dev = Device::Cpu;
    // Three tokens, hidden dim 4; the last one is padding.
    let h = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 3.0, 2.0, 1.0, 0.0, 9.0, 9.0, 9.0, 9.0], (1, 3, 4), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 1, 0], (1, 3), &dev).unwrap();
    let out: Vec<Vec<f32>> = masked_mean_l2(&h, &mask).unwrap().to_vec2().unwrap();
    // mean = [2, 2, 2, 2], normalized to 0.5 each
    assert!(out[0].iter().all(|x| (x - 0.5).abs() < 1e-5), "{:?}", out[0]);
}

#[test]
fn each_row_is_unit_length() {
    let dev = Device::Cpu;
    let h = Tensor::from_slice(&[3.0f32, 4.0, 1.0, 1.0, 0.0, 2.0, 5.0, 5.0], (2, 2, 2), &dev).unwrap();
    let mask = Tensor::ones((2, 2), DType::F32, &dev).unwrap();
    let out: Vec<Vec<f32>> = masked_mean_l2(&h, &mask).unwrap().to_vec2().unwrap();
    for row in out {
        let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}

#[test]
fn rank_two_input_is_rejected() {
    let dev = Device::Cpu;
    let h = Tensor::zeros((2, 4), DType::F32, &dev).unwrap();
    let mask = Tensor::ones((2, 4), DType::F32, &dev).unwrap();
    assert!(masked_mean_l2(&h, &mask).is_err());
}
