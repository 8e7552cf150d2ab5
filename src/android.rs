// JNI bridge for com.demo.audiosynthesizer.NativeAudioSynthesizer
//
// Every export forwards to the blocking `api` functions. Failures surface on
// the Java side as IllegalStateException; an unknown waveform ordinal raises
// IllegalArgumentException.

use jni::objects::JObject;
use jni::sys::{jboolean, jfloat, jint, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use log::warn;

use crate::api;
use crate::error::SynthError;
use crate::synth::Waveform;

const ILLEGAL_STATE: &str = "java/lang/IllegalStateException";
const ILLEGAL_ARGUMENT: &str = "java/lang/IllegalArgumentException";

fn throw(env: &mut JNIEnv, class: &str, message: String) {
    if let Err(err) = env.throw_new(class, message) {
        warn!("[JNI] Failed to raise {}: {}", class, err);
    }
}

fn report(env: &mut JNIEnv, result: Result<(), SynthError>) {
    if let Err(err) = result {
        throw(env, ILLEGAL_STATE, err.to_string());
    }
}

#[no_mangle]
pub extern "system" fn Java_com_demo_audiosynthesizer_NativeAudioSynthesizer_nativeResume<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    report(&mut env, api::resume());
}

#[no_mangle]
pub extern "system" fn Java_com_demo_audiosynthesizer_NativeAudioSynthesizer_nativePause<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    report(&mut env, api::pause());
}

#[no_mangle]
pub extern "system" fn Java_com_demo_audiosynthesizer_NativeAudioSynthesizer_nativePlay<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    report(&mut env, api::play());
}

#[no_mangle]
pub extern "system" fn Java_com_demo_audiosynthesizer_NativeAudioSynthesizer_nativeStop<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    report(&mut env, api::stop());
}

#[no_mangle]
pub extern "system" fn Java_com_demo_audiosynthesizer_NativeAudioSynthesizer_nativeIsPlaying<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jboolean {
    match api::is_playing() {
        Ok(true) => JNI_TRUE,
        Ok(false) => JNI_FALSE,
        Err(err) => {
            throw(&mut env, ILLEGAL_STATE, err.to_string());
            JNI_FALSE
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_demo_audiosynthesizer_NativeAudioSynthesizer_nativeSetFrequency<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    frequency_hz: jfloat,
) {
    report(&mut env, api::set_frequency(frequency_hz));
}

#[no_mangle]
pub extern "system" fn Java_com_demo_audiosynthesizer_NativeAudioSynthesizer_nativeSetVolume<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    volume_db: jfloat,
) {
    report(&mut env, api::set_volume(volume_db));
}

#[no_mangle]
pub extern "system" fn Java_com_demo_audiosynthesizer_NativeAudioSynthesizer_nativeSetWaveTable<
    'local,
>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    ordinal: jint,
) {
    match Waveform::from_ordinal(ordinal) {
        Some(waveform) => report(&mut env, api::set_waveform(waveform)),
        None => throw(
            &mut env,
            ILLEGAL_ARGUMENT,
            format!("unknown wavetable ordinal {ordinal}"),
        ),
    }
}
